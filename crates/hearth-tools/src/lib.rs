//! Tool Executor: the closed dispatch table behind every tool a model
//! provider may invoke — `files.*`, `runtime.*`, `sessions.*`,
//! `messages.send`, `agents.list`, and adapter stubs for `web.*`,
//! `memory.*`, and `cron`.
//!
//! This crate never depends on the session orchestrator. Session-shaped
//! tools reach back into it through the [`SessionRouter`] trait object the
//! orchestrator injects into [`ToolContext`] — the same dependency-inversion
//! shape a subagent spawner is handed through at construction time.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]

mod adapters;
mod agents_tool;
mod context;
mod error;
mod exec;
mod executor;
mod files;
mod process_tool;
mod registry;
mod sessions_tool;
#[cfg(test)]
mod test_support;
mod util;

pub use adapters::ADAPTER_TOOL_IDS;
pub use context::{SessionRouter, ToolContext};
pub use error::ToolFailure;
pub use executor::{execute, ToolInvocationResult};
pub use registry::{BuiltinTool, ToolRegistry};

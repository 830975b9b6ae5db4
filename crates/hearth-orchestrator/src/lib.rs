//! Session Orchestrator (component F of the architecture): owns
//! `createSession`/`postMessage`/`controlSession`, driving an abstract
//! [`ModelProvider`] while serializing turns per session.
//!
//! Generalizes the teacher's `AgentRuntime` — a concrete-LLM turn loop tied
//! to one provider SDK — into a provider-agnostic orchestration core. The
//! rest of the architecture (tools, auth, storage, catalog) is composed
//! here rather than duplicated.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]

mod config;
mod error;
mod model_provider;
mod orchestrator;
mod router;
mod runtime_state;
mod session_io;

pub use config::PostMessageConfig;
pub use error::{OrchestratorError, OrchestratorResult};
pub use model_provider::{
    channel_id, ChannelMessage, ChannelSnapshot, ChunkSink, ModelProvider, ModelProviderError,
    ModelRequest, RouteDecision, ToolInvocationRequest, ToolInvoker,
};
pub use orchestrator::{CreateSessionRequest, PostMessageOutcome, PostMessageRequest, SessionOrchestrator};
pub use router::OrchestratorRouter;

#[cfg(test)]
mod tests;

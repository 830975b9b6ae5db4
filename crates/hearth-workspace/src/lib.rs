//! Path confinement for the session orchestrator's filesystem and process
//! tools: every candidate path must resolve under the workspace root or an
//! explicit extra root before a tool is allowed to touch it.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]

mod boundary;
mod error;

pub use boundary::{PathCheck, WorkspaceBoundary};
pub use error::{WorkspaceError, WorkspaceResult};

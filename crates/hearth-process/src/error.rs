//! Errors raised by the process registry.

use thiserror::Error;

/// Errors from this crate.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The session already has `maxProcesses` live processes.
    #[error("process limit reached")]
    ProcessLimitReached,

    /// No process with the given id exists for the session.
    #[error("process not found: {0}")]
    ProcessNotFound(String),

    /// The child process could not be spawned.
    #[error("launch failed: {0}")]
    LaunchFailed(String),
}

/// Convenience alias for results returned by this crate.
pub type ProcessResult<T> = Result<T, ProcessError>;

//! Storage error taxonomy.

use thiserror::Error;

/// Errors from the event log store and persistence sink.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The referenced agent has no directory on disk.
    #[error("agent not found: {0}")]
    AgentNotFound(String),

    /// The referenced session's log file does not exist, or has no parsable events.
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// The caller supplied a structurally invalid request (empty batch, etc).
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// An underlying filesystem operation failed.
    #[error("storage failure: {0}")]
    StorageFailure(String),
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::StorageFailure(e.to_string())
    }
}

/// Convenience alias for results returned by this crate.
pub type StorageResult<T> = Result<T, StorageError>;

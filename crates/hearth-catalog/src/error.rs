//! Errors raised by the agent catalog and tools policy stores.

use thiserror::Error;

/// Errors from this crate.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The referenced agent has no directory on disk.
    #[error("agent not found: {0}")]
    AgentNotFound(String),

    /// An agent with this id already exists.
    #[error("agent already exists: {0}")]
    AlreadyExists(String),

    /// The caller's request or an on-disk document failed validation.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// An underlying filesystem operation failed.
    #[error("storage failure: {0}")]
    StorageFailure(String),
}

impl From<std::io::Error> for CatalogError {
    fn from(e: std::io::Error) -> Self {
        CatalogError::StorageFailure(e.to_string())
    }
}

/// Convenience alias for results returned by this crate.
pub type CatalogResult<T> = Result<T, CatalogError>;

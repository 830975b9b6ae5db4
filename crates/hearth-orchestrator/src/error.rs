//! Errors raised by the session orchestrator, wrapping every subsystem it
//! composes behind one `thiserror` enum.

use thiserror::Error;

/// Errors from this crate.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// The caller supplied a structurally invalid request.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// An event log or attachment operation failed.
    #[error(transparent)]
    Storage(#[from] hearth_storage::StorageError),

    /// A catalog read (agent, docs, policy) failed.
    #[error(transparent)]
    Catalog(#[from] hearth_catalog::CatalogError),

    /// The model provider reported a failure.
    #[error("model provider error: {0}")]
    ModelProvider(String),

    /// A post-create or post-append step failed after some state was
    /// already persisted.
    #[error("storage failure: {0}")]
    StorageFailure(String),
}

/// Convenience alias for results returned by this crate.
pub type OrchestratorResult<T> = Result<T, OrchestratorError>;

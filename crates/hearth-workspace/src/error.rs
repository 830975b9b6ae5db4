//! Errors raised by path confinement checks.

use thiserror::Error;

/// Errors from this crate.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// A resolved path did not fall under the workspace root or any extra root.
    #[error("path not allowed")]
    PathNotAllowed,
}

/// Convenience alias for results returned by this crate.
pub type WorkspaceResult<T> = Result<T, WorkspaceError>;

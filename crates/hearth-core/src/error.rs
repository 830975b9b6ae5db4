//! Error taxonomy for the core data model.

use thiserror::Error;

/// Errors raised constructing or validating core types.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An agent id failed validation.
    #[error("invalid agent id: {0:?}")]
    InvalidAgentId(String),

    /// A session id failed validation.
    #[error("invalid session id: {0:?}")]
    InvalidSessionId(String),

    /// A session title exceeded the maximum allowed length.
    #[error("session title exceeds {0} characters")]
    TitleTooLong(usize),
}

/// Convenience alias for results returned by this crate.
pub type CoreResult<T> = Result<T, CoreError>;

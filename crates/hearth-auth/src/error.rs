//! Errors raised while loading a policy to authorize against.

use thiserror::Error;

/// Errors from this crate.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The agent's tools policy could not be loaded or failed validation.
    #[error("failed to load tools policy: {0}")]
    PolicyUnavailable(#[from] hearth_catalog::CatalogError),
}

/// Convenience alias for results returned by this crate.
pub type AuthResult<T> = Result<T, AuthError>;

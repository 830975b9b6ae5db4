//! Errors raised configuring or initializing logging.

use thiserror::Error;

/// Errors from this crate.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The configuration itself was invalid (bad filter directive, etc).
    #[error("invalid logging configuration: {0}")]
    ConfigError(String),

    /// `tracing_subscriber` failed to install the global subscriber.
    #[error("failed to initialize logging: {0}")]
    InitError(String),
}

/// Convenience alias for results returned by this crate.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

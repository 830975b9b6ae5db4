//! Structured logging setup, shared by every Hearth binary and test harness.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{
    setup_default_logging, setup_logging, FileLogConfig, FileRotation, LogConfig, LogFormat,
    LogTarget,
};

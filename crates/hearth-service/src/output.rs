//! Renders command results as either pretty-printed JSON or a terse
//! one-line-per-field summary, selected by the CLI's global `--format` flag.

use serde::Serialize;

/// Output rendering selected by `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Indented JSON, suitable for piping into `jq`.
    Json,
    /// A compact human-readable rendering.
    Pretty,
}

impl Format {
    /// Parse the `--format` flag's value, defaulting to [`Format::Pretty`]
    /// for anything other than a literal `"json"`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("json") {
            Format::Json
        } else {
            Format::Pretty
        }
    }
}

/// Print `value` to stdout per `format`. In [`Format::Pretty`] mode this is
/// still JSON underneath (the CLI has no dedicated per-type renderer), just
/// without the `--format json` ceremony implied.
pub fn print_value<T: Serialize>(value: &T, format: Format) {
    match format {
        Format::Json => {
            println!("{}", serde_json::to_string(value).unwrap_or_else(|_| "null".to_string()));
        },
        Format::Pretty => {
            println!(
                "{}",
                serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string())
            );
        },
    }
}

//! The closed error taxonomy every tool reports through.

use serde::{Deserialize, Serialize};

/// A tool failure as it appears in a `toolResult` event: `{code, message, retryable}`.
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "camelCase")]
#[error("{code}: {message}")]
pub struct ToolFailure {
    /// Closed error code, e.g. `path_not_allowed`.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Whether the caller may usefully retry.
    pub retryable: bool,
}

impl ToolFailure {
    fn new(code: &str, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            retryable,
        }
    }

    /// `invalid_arguments`: the request was malformed.
    #[must_use]
    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::new("invalid_arguments", message, false)
    }

    /// `path_not_allowed`: the path escapes every configured root.
    #[must_use]
    pub fn path_not_allowed(path: impl std::fmt::Display) -> Self {
        Self::new("path_not_allowed", format!("path not allowed: {path}"), false)
    }

    /// `file_too_large`: a read exceeded the byte guardrail.
    #[must_use]
    pub fn file_too_large(max_bytes: u64) -> Self {
        Self::new(
            "file_too_large",
            format!("file exceeds the {max_bytes} byte limit"),
            false,
        )
    }

    /// `binary_not_supported`: the file is not valid UTF-8 text.
    #[must_use]
    pub fn binary_not_supported(path: impl std::fmt::Display) -> Self {
        Self::new(
            "binary_not_supported",
            format!("{path} appears to be a binary file"),
            false,
        )
    }

    /// `read_failed`: the filesystem read failed.
    #[must_use]
    pub fn read_failed(message: impl Into<String>) -> Self {
        Self::new("read_failed", message, true)
    }

    /// `content_too_large`: a write exceeded the byte guardrail.
    #[must_use]
    pub fn content_too_large(max_bytes: u64) -> Self {
        Self::new(
            "content_too_large",
            format!("content exceeds the {max_bytes} byte limit"),
            false,
        )
    }

    /// `write_failed`: the filesystem write failed.
    #[must_use]
    pub fn write_failed(message: impl Into<String>) -> Self {
        Self::new("write_failed", message, true)
    }

    /// `search_not_found`: `files.edit`'s `search` string matched zero times.
    #[must_use]
    pub fn search_not_found(path: impl std::fmt::Display) -> Self {
        Self::new(
            "search_not_found",
            format!("search string not found in {path}"),
            false,
        )
    }

    /// `command_denied`: the command matches a denied prefix.
    #[must_use]
    pub fn command_denied(command: impl std::fmt::Display) -> Self {
        Self::new(
            "command_denied",
            format!("command is denied by policy: {command}"),
            false,
        )
    }

    /// `exec_failed`: the child process could not be spawned or awaited.
    #[must_use]
    pub fn exec_failed(message: impl Into<String>) -> Self {
        Self::new("exec_failed", message, true)
    }

    /// `process_limit_reached`: the session already has `maxProcessesPerSession` live processes.
    #[must_use]
    pub fn process_limit_reached() -> Self {
        Self::new("process_limit_reached", "process limit reached", true)
    }

    /// `process_not_found`: no such managed process is registered.
    #[must_use]
    pub fn process_not_found(process_id: impl std::fmt::Display) -> Self {
        Self::new(
            "process_not_found",
            format!("process not found: {process_id}"),
            false,
        )
    }

    /// `launch_failed`: a managed process could not be spawned.
    #[must_use]
    pub fn launch_failed(message: impl Into<String>) -> Self {
        Self::new("launch_failed", message, false)
    }

    /// `agent_not_found`: no such agent exists.
    #[must_use]
    pub fn agent_not_found(agent_id: impl std::fmt::Display) -> Self {
        Self::new("agent_not_found", format!("agent not found: {agent_id}"), false)
    }

    /// `session_not_found`: no such session exists.
    #[must_use]
    pub fn session_not_found(session_id: impl std::fmt::Display) -> Self {
        Self::new(
            "session_not_found",
            format!("session not found: {session_id}"),
            false,
        )
    }

    /// `invalid_payload`: a structural precondition failed.
    #[must_use]
    pub fn invalid_payload(message: impl Into<String>) -> Self {
        Self::new("invalid_payload", message, false)
    }

    /// `storage_failure`: an underlying store reported an unexpected error.
    #[must_use]
    pub fn storage_failure(message: impl Into<String>) -> Self {
        Self::new("storage_failure", message, true)
    }

    /// `not_configured`: the tool is a known adapter id but no adapter is bound.
    #[must_use]
    pub fn not_configured(tool: impl std::fmt::Display) -> Self {
        Self::new(
            "not_configured",
            format!("{tool} has no adapter bound"),
            false,
        )
    }

    /// `unknown_tool`: the tool id is outside the closed dispatch table.
    #[must_use]
    pub fn unknown_tool(tool: impl std::fmt::Display) -> Self {
        Self::new("unknown_tool", format!("unknown tool: {tool}"), false)
    }
}

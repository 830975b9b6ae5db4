//! Invokes a tool by id and wraps its outcome in the uniform result shape.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

use crate::context::ToolContext;
use crate::error::ToolFailure;
use crate::registry::ToolRegistry;

/// The shape every tool call returns, on success or failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolInvocationResult {
    /// The tool id that was invoked.
    pub tool: String,
    /// Whether the call succeeded.
    pub ok: bool,
    /// Return data, present on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Error code, message and retryability, present on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ToolFailure>,
    /// Wall-clock milliseconds elapsed inside the executor.
    pub duration_ms: u64,
}

/// Dispatch `tool` through `registry`, timing the call and mapping an
/// unknown id to `unknown_tool` rather than panicking.
pub async fn execute(
    registry: &ToolRegistry,
    tool: &str,
    arguments: Value,
    ctx: &ToolContext,
) -> ToolInvocationResult {
    let started = Instant::now();

    let outcome = match registry.get(tool) {
        Some(implementation) => implementation.call(arguments, ctx).await,
        None => Err(ToolFailure::unknown_tool(tool)),
    };

    let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    match outcome {
        Ok(data) => ToolInvocationResult {
            tool: tool.to_string(),
            ok: true,
            data: Some(data),
            error: None,
            duration_ms,
        },
        Err(error) => ToolInvocationResult {
            tool: tool.to_string(),
            ok: false,
            data: None,
            error: Some(error),
            duration_ms,
        },
    }
}

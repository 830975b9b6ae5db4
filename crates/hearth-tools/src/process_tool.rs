//! `runtime.process`: delegates to the per-session process registry.

use std::path::PathBuf;

use async_trait::async_trait;
use hearth_process::ProcessError;
use serde_json::{json, Value};

use crate::context::ToolContext;
use crate::error::ToolFailure;
use crate::registry::BuiltinTool;
use crate::util::{confine, is_command_denied};

fn map_process_error(err: ProcessError) -> ToolFailure {
    match err {
        ProcessError::ProcessLimitReached => ToolFailure::process_limit_reached(),
        ProcessError::ProcessNotFound(id) => ToolFailure::process_not_found(id),
        ProcessError::LaunchFailed(message) => ToolFailure::launch_failed(message),
    }
}

/// `runtime.process`.
pub struct RuntimeProcessTool;

#[async_trait]
impl BuiltinTool for RuntimeProcessTool {
    fn id(&self) -> &'static str {
        "runtime.process"
    }

    async fn call(&self, args: Value, ctx: &ToolContext) -> Result<Value, ToolFailure> {
        let action = args
            .get("action")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolFailure::invalid_arguments("action is required"))?;
        let session_id = ctx.session_id.as_str();

        match action {
            "start" => {
                let command = args
                    .get("command")
                    .and_then(Value::as_str)
                    .ok_or_else(|| ToolFailure::invalid_arguments("command is required"))?;
                let arguments: Vec<String> = args
                    .get("arguments")
                    .and_then(Value::as_array)
                    .map(|a| {
                        a.iter()
                            .filter_map(|v| v.as_str().map(str::to_string))
                            .collect()
                    })
                    .unwrap_or_default();
                let cwd: Option<PathBuf> = args.get("cwd").and_then(Value::as_str).map(PathBuf::from);

                if let Some(cwd) = &cwd {
                    confine(&ctx.workspace, cwd, &ctx.guardrails.allowed_exec_roots)?;
                }
                if is_command_denied(command, &arguments, &ctx.guardrails.denied_command_prefixes) {
                    return Err(ToolFailure::command_denied(command));
                }

                let info = ctx
                    .processes
                    .start(
                        session_id,
                        command,
                        &arguments,
                        cwd,
                        ctx.guardrails.max_processes_per_session,
                    )
                    .await
                    .map_err(map_process_error)?;
                serde_json::to_value(info).map_err(|e| ToolFailure::storage_failure(e.to_string()))
            },
            "status" => {
                let process_id = args
                    .get("processId")
                    .and_then(Value::as_str)
                    .ok_or_else(|| ToolFailure::invalid_arguments("processId is required"))?;
                let info = ctx
                    .processes
                    .status(session_id, process_id)
                    .await
                    .map_err(map_process_error)?;
                serde_json::to_value(info).map_err(|e| ToolFailure::storage_failure(e.to_string()))
            },
            "stop" => {
                let process_id = args
                    .get("processId")
                    .and_then(Value::as_str)
                    .ok_or_else(|| ToolFailure::invalid_arguments("processId is required"))?;
                let info = ctx
                    .processes
                    .stop(session_id, process_id)
                    .await
                    .map_err(map_process_error)?;
                serde_json::to_value(info).map_err(|e| ToolFailure::storage_failure(e.to_string()))
            },
            "list" => {
                let infos = ctx
                    .processes
                    .list(session_id)
                    .await
                    .map_err(map_process_error)?;
                serde_json::to_value(infos).map_err(|e| ToolFailure::storage_failure(e.to_string()))
            },
            other => Err(ToolFailure::invalid_arguments(format!(
                "unknown runtime.process action: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_ctx;
    use tempfile::TempDir;

    #[tokio::test]
    async fn start_then_status_round_trips() {
        let dir = TempDir::new().unwrap();
        let ctx = test_ctx(dir.path());
        let started = RuntimeProcessTool
            .call(json!({"action": "start", "command": "sleep", "arguments": ["1"]}), &ctx)
            .await
            .unwrap();
        let process_id = started["id"].as_str().unwrap();

        let status = RuntimeProcessTool
            .call(json!({"action": "status", "processId": process_id}), &ctx)
            .await
            .unwrap();
        assert_eq!(status["running"], true);
    }

    #[tokio::test]
    async fn start_rejects_denied_command() {
        let dir = TempDir::new().unwrap();
        let mut ctx = test_ctx(dir.path());
        ctx.guardrails.denied_command_prefixes = vec!["mkfs".to_string()];
        let result = RuntimeProcessTool
            .call(json!({"action": "start", "command": "mkfs.ext4"}), &ctx)
            .await;
        assert_eq!(result.unwrap_err().code, "command_denied");
    }

    #[tokio::test]
    async fn list_is_empty_for_unknown_session() {
        let dir = TempDir::new().unwrap();
        let ctx = test_ctx(dir.path());
        let result = RuntimeProcessTool
            .call(json!({"action": "list"}), &ctx)
            .await
            .unwrap();
        assert_eq!(result.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn status_unknown_process_reports_not_found() {
        let dir = TempDir::new().unwrap();
        let ctx = test_ctx(dir.path());
        let result = RuntimeProcessTool
            .call(json!({"action": "status", "processId": "nope"}), &ctx)
            .await;
        assert_eq!(result.unwrap_err().code, "process_not_found");
    }
}

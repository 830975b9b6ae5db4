//! `runtime.exec`: a single foreground command, raced against a timeout.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::io::AsyncReadExt;

use crate::context::ToolContext;
use crate::error::ToolFailure;
use crate::registry::BuiltinTool;
use crate::util::{confine, is_command_denied, truncate_and_decode};

/// Exit code reported for a killed, timed-out child when the OS doesn't
/// hand back a concrete status (e.g. terminated by signal on Unix).
/// Matches the coreutils `timeout` convention.
const TIMED_OUT_EXIT_CODE: i32 = 124;

/// `runtime.exec`.
pub struct RuntimeExecTool;

#[async_trait]
impl BuiltinTool for RuntimeExecTool {
    fn id(&self) -> &'static str {
        "runtime.exec"
    }

    async fn call(&self, args: Value, ctx: &ToolContext) -> Result<Value, ToolFailure> {
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

        let timeout_ms = args
            .get("timeoutMs")
            .and_then(Value::as_u64)
            .unwrap_or(ctx.guardrails.exec_timeout_ms);

        let cwd: PathBuf = args
            .get("cwd")
            .and_then(Value::as_str)
            .map_or_else(|| ctx.workspace.root().to_path_buf(), PathBuf::from);

        confine(&ctx.workspace, &cwd, &ctx.guardrails.allowed_exec_roots)?;

        if is_command_denied(command, &arguments, &ctx.guardrails.denied_command_prefixes) {
            return Err(ToolFailure::command_denied(command));
        }

        run(command, &arguments, &cwd, timeout_ms, ctx.guardrails.max_exec_output_bytes).await
    }
}

async fn run(
    command: &str,
    arguments: &[String],
    cwd: &Path,
    timeout_ms: u64,
    max_output_bytes: u64,
) -> Result<Value, ToolFailure> {
    let mut cmd = tokio::process::Command::new(command);
    cmd.args(arguments)
        .current_dir(cwd)
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        // Belt-and-suspenders: if this future itself is dropped (caller
        // cancellation), kill_on_drop still terminates the child.
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .map_err(|e| ToolFailure::exec_failed(e.to_string()))?;

    let mut stdout_pipe = child.stdout.take().expect("stdout piped");
    let mut stderr_pipe = child.stderr.take().expect("stderr piped");
    let stdout_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        let _ = stdout_pipe.read_to_end(&mut buf).await;
        buf
    });
    let stderr_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        let _ = stderr_pipe.read_to_end(&mut buf).await;
        buf
    });

    match tokio::time::timeout(Duration::from_millis(timeout_ms), child.wait()).await {
        Ok(Ok(status)) => {
            let stdout = stdout_task.await.unwrap_or_default();
            let stderr = stderr_task.await.unwrap_or_default();
            Ok(json!({
                "stdout": truncate_and_decode(&stdout, max_output_bytes),
                "stderr": truncate_and_decode(&stderr, max_output_bytes),
                "exitCode": status.code(),
                "timedOut": false,
            }))
        },
        Ok(Err(e)) => Err(ToolFailure::exec_failed(e.to_string())),
        Err(_elapsed) => {
            stdout_task.abort();
            stderr_task.abort();
            // The timeout lost the race against `child.wait()`; kill the
            // child and wait for its actual exit so the reported code
            // reflects a real (non-zero) termination, not a guess.
            let _ = child.kill().await;
            let exit_code = child
                .wait()
                .await
                .ok()
                .and_then(|status| status.code())
                .unwrap_or(TIMED_OUT_EXIT_CODE);
            Ok(json!({
                "stdout": "",
                "stderr": "",
                "exitCode": exit_code,
                "timedOut": true,
            }))
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_ctx;
    use tempfile::TempDir;

    #[tokio::test]
    async fn runs_command_and_captures_stdout() {
        let dir = TempDir::new().unwrap();
        let ctx = test_ctx(dir.path());
        let result = RuntimeExecTool
            .call(json!({"command": "echo", "arguments": ["hello"]}), &ctx)
            .await
            .unwrap();
        assert!(result["stdout"].as_str().unwrap().contains("hello"));
        assert_eq!(result["exitCode"], 0);
        assert_eq!(result["timedOut"], false);
    }

    #[tokio::test]
    async fn reports_nonzero_exit_code() {
        let dir = TempDir::new().unwrap();
        let ctx = test_ctx(dir.path());
        let result = RuntimeExecTool
            .call(json!({"command": "sh", "arguments": ["-c", "exit 7"]}), &ctx)
            .await
            .unwrap();
        assert_eq!(result["exitCode"], 7);
    }

    #[tokio::test]
    async fn times_out_long_running_command() {
        let dir = TempDir::new().unwrap();
        let ctx = test_ctx(dir.path());
        let result = RuntimeExecTool
            .call(
                json!({"command": "sleep", "arguments": ["5"], "timeoutMs": 50}),
                &ctx,
            )
            .await
            .unwrap();
        assert_eq!(result["timedOut"], true);
        assert!(result["exitCode"].as_i64().unwrap() != 0);
    }

    #[tokio::test]
    async fn rejects_denied_command() {
        let dir = TempDir::new().unwrap();
        let mut ctx = test_ctx(dir.path());
        ctx.guardrails.denied_command_prefixes = vec!["mkfs".to_string()];
        let result = RuntimeExecTool
            .call(json!({"command": "mkfs.ext4", "arguments": []}), &ctx)
            .await;
        assert_eq!(result.unwrap_err().code, "command_denied");
    }

    #[tokio::test]
    async fn rejects_cwd_outside_allowed_roots() {
        let dir = TempDir::new().unwrap();
        let ctx = test_ctx(dir.path());
        let result = RuntimeExecTool
            .call(json!({"command": "echo", "cwd": "/etc"}), &ctx)
            .await;
        assert_eq!(result.unwrap_err().code, "path_not_allowed");
    }
}

//! `sessions.spawn/list/history/status/send` and `messages.send`.
//!
//! All five delegate to the [`crate::context::SessionRouter`] the
//! orchestrator injects into [`ToolContext`]; with none bound they report
//! `not_configured`, same as an unbound adapter.

use async_trait::async_trait;
use hearth_core::SessionId;
use serde_json::Value;

use crate::context::ToolContext;
use crate::error::ToolFailure;
use crate::registry::BuiltinTool;

fn router(ctx: &ToolContext, tool: &str) -> Result<&std::sync::Arc<dyn crate::context::SessionRouter>, ToolFailure> {
    ctx.router.as_ref().ok_or_else(|| ToolFailure::not_configured(tool))
}

/// `sessions.spawn`.
pub struct SessionsSpawnTool;

#[async_trait]
impl BuiltinTool for SessionsSpawnTool {
    fn id(&self) -> &'static str {
        "sessions.spawn"
    }

    async fn call(&self, args: Value, ctx: &ToolContext) -> Result<Value, ToolFailure> {
        let router = router(ctx, self.id())?;
        let title = args.get("title").and_then(Value::as_str).map(str::to_string);
        let parent_session_id = match args.get("parentSessionId").and_then(Value::as_str) {
            Some(raw) => Some(
                SessionId::new(raw)
                    .map_err(|e| ToolFailure::invalid_arguments(e.to_string()))?,
            ),
            None => None,
        };
        router.spawn_session(&ctx.agent_id, title, parent_session_id).await
    }
}

/// `sessions.list`.
pub struct SessionsListTool;

#[async_trait]
impl BuiltinTool for SessionsListTool {
    fn id(&self) -> &'static str {
        "sessions.list"
    }

    async fn call(&self, _args: Value, ctx: &ToolContext) -> Result<Value, ToolFailure> {
        router(ctx, self.id())?.list_sessions(&ctx.agent_id).await
    }
}

fn session_id_arg(args: &Value, ctx: &ToolContext) -> Result<SessionId, ToolFailure> {
    match args.get("sessionId").and_then(Value::as_str) {
        Some(raw) => SessionId::new(raw).map_err(|e| ToolFailure::invalid_arguments(e.to_string())),
        None => Ok(ctx.session_id.clone()),
    }
}

/// `sessions.history`.
pub struct SessionsHistoryTool;

#[async_trait]
impl BuiltinTool for SessionsHistoryTool {
    fn id(&self) -> &'static str {
        "sessions.history"
    }

    async fn call(&self, args: Value, ctx: &ToolContext) -> Result<Value, ToolFailure> {
        let session_id = session_id_arg(&args, ctx)?;
        router(ctx, self.id())?
            .session_history(&ctx.agent_id, &session_id)
            .await
    }
}

/// `sessions.status`.
pub struct SessionsStatusTool;

#[async_trait]
impl BuiltinTool for SessionsStatusTool {
    fn id(&self) -> &'static str {
        "sessions.status"
    }

    async fn call(&self, args: Value, ctx: &ToolContext) -> Result<Value, ToolFailure> {
        let session_id = session_id_arg(&args, ctx)?;
        router(ctx, self.id())?
            .session_status(&ctx.agent_id, &session_id)
            .await
    }
}

/// `sessions.send` / `messages.send` — the same behavior under two ids.
pub struct SessionsSendTool {
    id: &'static str,
}

impl SessionsSendTool {
    /// Bind this implementation to a specific tool id.
    #[must_use]
    pub fn new(id: &'static str) -> Self {
        Self { id }
    }
}

#[async_trait]
impl BuiltinTool for SessionsSendTool {
    fn id(&self) -> &'static str {
        self.id
    }

    async fn call(&self, args: Value, ctx: &ToolContext) -> Result<Value, ToolFailure> {
        let content = args
            .get("content")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolFailure::invalid_arguments("content is required"))?;
        if content.trim().is_empty() {
            return Err(ToolFailure::invalid_arguments("content must not be blank"));
        }
        let user_id = args.get("userId").and_then(Value::as_str).map(str::to_string);
        let session_id = session_id_arg(&args, ctx)?;

        router(ctx, self.id())?
            .send_message(&ctx.agent_id, &session_id, content.to_string(), user_id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_ctx;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn reports_not_configured_without_router() {
        let dir = TempDir::new().unwrap();
        let ctx = test_ctx(dir.path());
        let result = SessionsListTool.call(json!({}), &ctx).await;
        assert_eq!(result.unwrap_err().code, "not_configured");
    }

    #[tokio::test]
    async fn send_rejects_blank_content() {
        let dir = TempDir::new().unwrap();
        let ctx = test_ctx(dir.path());
        let result = SessionsSendTool::new("messages.send")
            .call(json!({"content": "   "}), &ctx)
            .await;
        assert_eq!(result.unwrap_err().code, "invalid_arguments");
    }
}

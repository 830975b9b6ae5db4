//! Implements [`hearth_tools::SessionRouter`] over the orchestrator itself,
//! the dependency-inversion seam that lets `sessions.*`/`messages.send`
//! reach back into session orchestration without `hearth-tools` depending
//! on this crate.

use std::sync::Arc;

use async_trait::async_trait;
use hearth_core::{AgentId, SessionId};
use hearth_tools::{SessionRouter, ToolFailure};
use serde_json::Value;

use crate::error::OrchestratorError;
use crate::orchestrator::{CreateSessionRequest, PostMessageRequest, SessionOrchestrator};

/// Maps an [`OrchestratorError`] onto the tool-facing `{code, message,
/// retryable}` shape.
pub(crate) fn to_tool_failure(err: OrchestratorError) -> ToolFailure {
    match err {
        OrchestratorError::InvalidPayload(msg) => ToolFailure::invalid_payload(msg),
        OrchestratorError::Storage(hearth_storage::StorageError::AgentNotFound(id)) => {
            ToolFailure::agent_not_found(id)
        },
        OrchestratorError::Storage(hearth_storage::StorageError::SessionNotFound(id)) => {
            ToolFailure::session_not_found(id)
        },
        other => ToolFailure::storage_failure(other.to_string()),
    }
}

/// `SessionRouter` implementation handed to every [`hearth_tools::ToolContext`]
/// the orchestrator constructs.
pub struct OrchestratorRouter(pub Arc<SessionOrchestrator>);

#[async_trait]
impl SessionRouter for OrchestratorRouter {
    async fn spawn_session(
        &self,
        agent_id: &AgentId,
        title: Option<String>,
        parent_session_id: Option<SessionId>,
    ) -> Result<Value, ToolFailure> {
        let summary = self
            .0
            .create_session(
                agent_id,
                CreateSessionRequest {
                    id: None,
                    title,
                    parent_session_id,
                },
            )
            .await
            .map_err(to_tool_failure)?;
        serde_json::to_value(summary).map_err(|e| ToolFailure::storage_failure(e.to_string()))
    }

    async fn list_sessions(&self, agent_id: &AgentId) -> Result<Value, ToolFailure> {
        let summaries = self.0.list_sessions(agent_id).map_err(to_tool_failure)?;
        serde_json::to_value(summaries).map_err(|e| ToolFailure::storage_failure(e.to_string()))
    }

    async fn session_history(
        &self,
        agent_id: &AgentId,
        session_id: &SessionId,
    ) -> Result<Value, ToolFailure> {
        let (summary, events) = self
            .0
            .load_history(agent_id, session_id)
            .map_err(to_tool_failure)?;
        Ok(serde_json::json!({ "summary": summary, "events": events }))
    }

    async fn session_status(
        &self,
        agent_id: &AgentId,
        session_id: &SessionId,
    ) -> Result<Value, ToolFailure> {
        self.0
            .session_status(agent_id, session_id)
            .await
            .map_err(to_tool_failure)
    }

    async fn send_message(
        &self,
        agent_id: &AgentId,
        session_id: &SessionId,
        content: String,
        user_id: Option<String>,
    ) -> Result<Value, ToolFailure> {
        // A tool call that recursively posts to its own session must not
        // block on the full nested turn: `postMessage` holds this session's
        // `op_lock` for the whole call, so a same-session send would
        // deadlock if awaited inline. Queue it as a detached turn instead,
        // matching the actor model's asynchronous-mailbox semantics.
        let orchestrator = Arc::clone(&self.0);
        let agent_id = agent_id.clone();
        let session_id = session_id.clone();
        tokio::spawn(async move {
            let request = PostMessageRequest {
                user_id: user_id.unwrap_or_else(|| "tool".to_string()),
                content,
                attachments: Vec::new(),
                spawn_sub_session: false,
            };
            if let Err(e) = orchestrator.post_message(&agent_id, &session_id, request).await {
                tracing::warn!(%agent_id, %session_id, error = %e, "queued session send failed");
            }
        });

        Ok(serde_json::json!({ "queued": true, "sessionId": session_id.as_str() }))
    }
}

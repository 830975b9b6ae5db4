//! Shared context threaded through every tool call.
//!
//! Mirrors the dependency-inversion shape of a subagent spawner handed to a
//! tool at construction time: the executor itself never depends on the
//! orchestrator crate, so session-shaped tools (`sessions.*`, `messages.send`)
//! reach back into it through the [`SessionRouter`] trait object the caller
//! injects.

use std::sync::Arc;

use async_trait::async_trait;
use hearth_catalog::AgentCatalogStore;
use hearth_core::{AgentId, SessionId};
use hearth_process::ProcessRegistry;
use hearth_workspace::WorkspaceBoundary;
use serde_json::Value;

use crate::error::ToolFailure;

/// The orchestrator-shaped operations `sessions.*` / `messages.send` need.
///
/// Implemented by the session orchestrator and injected into [`ToolContext`];
/// left unset, those tools report `not_configured` like an unbound adapter.
#[async_trait]
pub trait SessionRouter: Send + Sync {
    /// `sessions.spawn`.
    async fn spawn_session(
        &self,
        agent_id: &AgentId,
        title: Option<String>,
        parent_session_id: Option<SessionId>,
    ) -> Result<Value, ToolFailure>;

    /// `sessions.list`.
    async fn list_sessions(&self, agent_id: &AgentId) -> Result<Value, ToolFailure>;

    /// `sessions.history`.
    async fn session_history(
        &self,
        agent_id: &AgentId,
        session_id: &SessionId,
    ) -> Result<Value, ToolFailure>;

    /// `sessions.status`.
    async fn session_status(
        &self,
        agent_id: &AgentId,
        session_id: &SessionId,
    ) -> Result<Value, ToolFailure>;

    /// `sessions.send` / `messages.send`.
    async fn send_message(
        &self,
        agent_id: &AgentId,
        session_id: &SessionId,
        content: String,
        user_id: Option<String>,
    ) -> Result<Value, ToolFailure>;
}

/// Everything a tool call needs beyond its own arguments.
#[derive(Clone)]
pub struct ToolContext {
    /// The agent this call is scoped to.
    pub agent_id: AgentId,
    /// The session this call is scoped to (the default when a tool accepts
    /// an optional `sessionId` override).
    pub session_id: SessionId,
    /// Path confinement for `files.*` and `runtime.*`.
    pub workspace: WorkspaceBoundary,
    /// Numeric and list limits in force for this agent.
    pub guardrails: hearth_catalog::Guardrails,
    /// Per-session managed background processes.
    pub processes: Arc<ProcessRegistry>,
    /// Agent catalog, for `agents.list`.
    pub catalog: Arc<AgentCatalogStore>,
    /// Injected by the orchestrator; `None` means `sessions.*`/`messages.send`
    /// report `not_configured`.
    pub router: Option<Arc<dyn SessionRouter>>,
}

impl ToolContext {
    /// The session id a request should act on: its own `sessionId`, if
    /// given, else the context's default.
    #[must_use]
    pub fn resolve_session_id(&self, requested: Option<&str>) -> Option<SessionId> {
        match requested {
            Some(raw) => SessionId::new(raw).ok(),
            None => Some(self.session_id.clone()),
        }
    }
}

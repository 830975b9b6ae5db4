//! Test-only [`ToolContext`] construction shared across this crate's unit
//! tests.

use std::path::Path;
use std::sync::Arc;

use hearth_catalog::{AgentCatalogStore, Guardrails};
use hearth_core::{AgentId, SessionId};
use hearth_process::ProcessRegistry;
use hearth_workspace::WorkspaceBoundary;

use crate::context::ToolContext;

/// A [`ToolContext`] rooted at `root`, with default guardrails, an empty
/// process registry, an agent catalog under `root/agents`, and no session
/// router bound.
pub(crate) fn test_ctx(root: &Path) -> ToolContext {
    ToolContext {
        agent_id: AgentId::new("test-agent").unwrap(),
        session_id: SessionId::new("test-session").unwrap(),
        workspace: WorkspaceBoundary::new(root),
        guardrails: Guardrails::default(),
        processes: Arc::new(ProcessRegistry::new()),
        catalog: Arc::new(AgentCatalogStore::new(root.join("agents"))),
        router: None,
    }
}

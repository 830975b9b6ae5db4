//! Assembles one workspace's full component stack (A, B, C, D, E, H, behind
//! F) into a single [`SessionOrchestrator`], the construction order
//! component 4.F's own doc comment describes.

use std::path::Path;
use std::sync::Arc;

use hearth_catalog::{AgentCatalogStore, ToolsPolicyStore};
use hearth_orchestrator::{PostMessageConfig, SessionOrchestrator};
use hearth_process::ProcessRegistry;
use hearth_storage::{EventLogStore, PersistenceSink};
use hearth_tools::ToolRegistry;
use hearth_workspace::WorkspaceBoundary;

use crate::echo_provider::EchoModelProvider;

/// One workspace's component stack. `catalog`/`tools_policy` are exposed
/// directly alongside the orchestrator for the CLI's agent-management
/// commands, which sit in front of the catalog rather than the orchestrator.
pub struct Workspace {
    /// Per-agent directory store (component B).
    pub catalog: Arc<AgentCatalogStore>,
    /// Per-agent tool policy store (component C).
    pub tools_policy: Arc<ToolsPolicyStore>,
    /// A second handle onto the same event log the orchestrator holds
    /// internally, for `sessions stream` to poll directly (component G
    /// reads the log itself rather than going through F).
    pub event_log: Arc<EventLogStore>,
    /// The session orchestrator (component F), wired to every other
    /// component plus the echo backend.
    pub orchestrator: Arc<SessionOrchestrator>,
}

/// Build the full stack rooted at `workspace_root`, with agents scaffolded
/// under `workspace_root/agents` and the workspace boundary confined to
/// `workspace_root` itself.
#[must_use]
pub fn build(workspace_root: &Path) -> Workspace {
    let agents_root = workspace_root.join("agents");
    let event_log = EventLogStore::new(agents_root.clone());
    let catalog = Arc::new(AgentCatalogStore::new(agents_root.clone()));
    let tools_policy = Arc::new(ToolsPolicyStore::new(agents_root));
    let tool_registry = Arc::new(ToolRegistry::with_defaults());
    let processes = Arc::new(ProcessRegistry::new());
    let workspace = WorkspaceBoundary::new(workspace_root);
    let sink = Arc::new(PersistenceSink::disabled());
    let provider = Arc::new(EchoModelProvider::default());

    let orchestrator = SessionOrchestrator::new_arc(
        event_log.clone(),
        Arc::clone(&catalog),
        Arc::clone(&tools_policy),
        tool_registry,
        processes,
        workspace,
        sink,
        provider,
        PostMessageConfig::default(),
    );

    Workspace { catalog, tools_policy, event_log: Arc::new(event_log), orchestrator }
}

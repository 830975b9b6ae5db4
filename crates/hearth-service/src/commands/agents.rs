//! Agent catalog commands: create, list, and inspect a tools policy.

use anyhow::{Context, Result};
use hearth_catalog::{AgentCatalogStore, CreateAgentRequest, ToolsPolicyStore};
use hearth_core::AgentId;

use crate::output::{print_value, Format};

/// `agents create`.
pub fn create(
    catalog: &AgentCatalogStore,
    id: AgentId,
    display_name: String,
    role: String,
    model: Option<String>,
    format: Format,
) -> Result<()> {
    let summary = catalog
        .create_agent(CreateAgentRequest { id: id.clone(), display_name, role, selected_model: model })
        .with_context(|| format!("creating agent {id}"))?;
    print_value(&summary, format);
    Ok(())
}

/// `agents list`.
pub fn list(catalog: &AgentCatalogStore, format: Format) -> Result<()> {
    let agents = catalog.list_agents().context("listing agents")?;
    print_value(&agents, format);
    Ok(())
}

/// `agents policy` — show the agent's resolved tools policy.
pub fn policy(tools_policy: &ToolsPolicyStore, id: AgentId, format: Format) -> Result<()> {
    let policy = tools_policy.read(&id).with_context(|| format!("reading tools policy for {id}"))?;
    print_value(&policy, format);
    Ok(())
}

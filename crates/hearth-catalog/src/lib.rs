//! Agent Catalog Store and Tools Policy Store for the Hearth session
//! orchestrator: per-agent directory scaffolding, markdown bootstrap
//! documents, and validated tool policies.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]

mod agent;
mod error;
mod tools_policy;

pub use agent::{AgentCatalogStore, CreateAgentRequest, DocName};
pub use error::{CatalogError, CatalogResult};
pub use tools_policy::{
    DefaultPolicy, Guardrails, ToolPolicyEntry, ToolsPolicy, ToolsPolicyStore, KNOWN_TOOLS,
};

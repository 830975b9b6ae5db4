//! `agents.list`.

use async_trait::async_trait;
use serde_json::Value;

use crate::context::ToolContext;
use crate::error::ToolFailure;
use crate::registry::BuiltinTool;

/// `agents.list`.
pub struct AgentsListTool;

#[async_trait]
impl BuiltinTool for AgentsListTool {
    fn id(&self) -> &'static str {
        "agents.list"
    }

    async fn call(&self, _args: Value, ctx: &ToolContext) -> Result<Value, ToolFailure> {
        let agents = ctx
            .catalog
            .list_agents()
            .map_err(|e| ToolFailure::storage_failure(e.to_string()))?;
        serde_json::to_value(agents).map_err(|e| ToolFailure::storage_failure(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_ctx;
    use hearth_catalog::CreateAgentRequest;
    use hearth_core::AgentId;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn lists_created_agents() {
        let dir = TempDir::new().unwrap();
        let ctx = test_ctx(dir.path());
        ctx.catalog
            .create_agent(CreateAgentRequest {
                id: AgentId::new("a1").unwrap(),
                display_name: "A".to_string(),
                role: "R".to_string(),
                selected_model: None,
            })
            .unwrap();

        let result = AgentsListTool.call(json!({}), &ctx).await.unwrap();
        let list = result.as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["id"], "a1");
    }
}

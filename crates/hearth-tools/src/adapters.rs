//! Stubs for the adapter-backed tools: `web.search`, `web.fetch`,
//! `memory.get`, `memory.search`, `cron`. This milestone binds no adapters,
//! so every one of these always reports `not_configured`.

use async_trait::async_trait;
use serde_json::Value;

use crate::context::ToolContext;
use crate::error::ToolFailure;
use crate::registry::BuiltinTool;

/// Every adapter-backed tool id in the closed catalog.
pub const ADAPTER_TOOL_IDS: &[&str] =
    &["web.search", "web.fetch", "memory.get", "memory.search", "cron"];

/// A tool id known to the catalog with no adapter implementation bound.
pub struct AdapterStubTool {
    id: &'static str,
}

impl AdapterStubTool {
    /// Bind the stub to a specific adapter tool id.
    #[must_use]
    pub fn new(id: &'static str) -> Self {
        Self { id }
    }
}

#[async_trait]
impl BuiltinTool for AdapterStubTool {
    fn id(&self) -> &'static str {
        self.id
    }

    async fn call(&self, _args: Value, _ctx: &ToolContext) -> Result<Value, ToolFailure> {
        Err(ToolFailure::not_configured(self.id))
    }
}

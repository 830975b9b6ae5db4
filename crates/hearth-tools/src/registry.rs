//! The dispatch table: one [`BuiltinTool`] per closed-set tool id.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::context::ToolContext;
use crate::error::ToolFailure;

/// One entry in the tool executor's dispatch table.
#[async_trait]
pub trait BuiltinTool: Send + Sync {
    /// The tool id this implementation answers to, e.g. `"files.read"`.
    fn id(&self) -> &'static str;

    /// Execute the tool against `arguments`, returning its `data` payload on
    /// success.
    async fn call(&self, arguments: Value, ctx: &ToolContext) -> Result<Value, ToolFailure>;
}

/// A table of tool id to implementation.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<&'static str, Box<dyn BuiltinTool>>,
}

impl ToolRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every tool named in the closed tool catalog
    /// registered — `files.*`, `runtime.*`, `sessions.*`, `messages.send`,
    /// `agents.list`, and the adapter stubs.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(crate::files::FilesReadTool));
        registry.register(Box::new(crate::files::FilesWriteTool));
        registry.register(Box::new(crate::files::FilesEditTool));
        registry.register(Box::new(crate::exec::RuntimeExecTool));
        registry.register(Box::new(crate::process_tool::RuntimeProcessTool));
        registry.register(Box::new(crate::sessions_tool::SessionsSpawnTool));
        registry.register(Box::new(crate::sessions_tool::SessionsListTool));
        registry.register(Box::new(crate::sessions_tool::SessionsHistoryTool));
        registry.register(Box::new(crate::sessions_tool::SessionsStatusTool));
        registry.register(Box::new(crate::sessions_tool::SessionsSendTool::new(
            "sessions.send",
        )));
        registry.register(Box::new(crate::sessions_tool::SessionsSendTool::new(
            "messages.send",
        )));
        registry.register(Box::new(crate::agents_tool::AgentsListTool));
        for id in crate::adapters::ADAPTER_TOOL_IDS {
            registry.register(Box::new(crate::adapters::AdapterStubTool::new(id)));
        }
        registry
    }

    /// Register (or replace) a tool implementation.
    pub fn register(&mut self, tool: Box<dyn BuiltinTool>) {
        self.tools.insert(tool.id(), tool);
    }

    /// Look up a tool by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&dyn BuiltinTool> {
        self.tools.get(id).map(std::convert::AsRef::as_ref)
    }

    /// `true` if `id` names a registered tool.
    #[must_use]
    pub fn is_builtin(&self, id: &str) -> bool {
        self.tools.contains_key(id)
    }

    /// Every registered tool id, in arbitrary order.
    #[must_use]
    pub fn tool_ids(&self) -> Vec<&'static str> {
        self.tools.keys().copied().collect()
    }
}

//! Tools Policy Store: reads/writes `tools/tools.json` per agent.

use hearth_core::AgentId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::{CatalogError, CatalogResult};

/// The closed set of tool identifiers a policy may name.
pub const KNOWN_TOOLS: &[&str] = &[
    "files.read",
    "files.edit",
    "files.write",
    "runtime.exec",
    "runtime.process",
    "sessions.spawn",
    "sessions.list",
    "sessions.history",
    "sessions.status",
    "sessions.send",
    "messages.send",
    "agents.list",
    "web.search",
    "web.fetch",
    "memory.get",
    "memory.search",
    "cron",
];

/// Default policy applied to a tool with no explicit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultPolicy {
    /// Allow unless explicitly denied.
    Allow,
    /// Deny unless explicitly allowed.
    Deny,
}

/// Per-tool override.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolPolicyEntry {
    /// Explicit allow/deny for this tool.
    pub allow: bool,
}

/// Numeric and list limits the tool executor enforces before doing work.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guardrails {
    /// Maximum bytes `files.read` may return.
    pub max_read_bytes: u64,
    /// Maximum bytes `files.write`/`files.edit` may write.
    pub max_write_bytes: u64,
    /// Default timeout for `runtime.exec`, in milliseconds.
    pub exec_timeout_ms: u64,
    /// Maximum combined stdout+stderr bytes retained from `runtime.exec`.
    pub max_exec_output_bytes: u64,
    /// Maximum live processes per session.
    pub max_processes_per_session: u32,
    /// Maximum tool calls per rolling minute.
    pub max_tool_calls_per_minute: u32,
    /// Timeout for `web.*` adapter calls, in milliseconds.
    pub web_timeout_ms: u64,
    /// Maximum bytes a `web.*` adapter call may return.
    pub web_max_bytes: u64,
    /// Command prefixes `runtime.exec`/`runtime.process` must never match.
    pub denied_command_prefixes: Vec<String>,
    /// Extra roots, beyond the workspace root, that `files.write` may touch.
    pub allowed_write_roots: Vec<PathBuf>,
    /// Extra roots, beyond the workspace root, that `runtime.exec`/`runtime.process` may touch.
    pub allowed_exec_roots: Vec<PathBuf>,
}

impl Default for Guardrails {
    fn default() -> Self {
        Self {
            max_read_bytes: 10 * 1024 * 1024,
            max_write_bytes: 10 * 1024 * 1024,
            exec_timeout_ms: 30_000,
            max_exec_output_bytes: 1024 * 1024,
            max_processes_per_session: 8,
            max_tool_calls_per_minute: 120,
            web_timeout_ms: 15_000,
            web_max_bytes: 5 * 1024 * 1024,
            denied_command_prefixes: vec![
                "rm -rf /".to_string(),
                "mkfs".to_string(),
                "dd if=".to_string(),
                ":(){:|:&};:".to_string(),
            ],
            allowed_write_roots: Vec::new(),
            allowed_exec_roots: Vec::new(),
        }
    }
}

/// An agent's tools policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsPolicy {
    /// Schema version; currently must be `1`.
    pub version: u32,
    /// Fallback decision for tools with no explicit entry.
    pub default_policy: DefaultPolicy,
    /// Explicit per-tool overrides.
    pub tools: BTreeMap<String, ToolPolicyEntry>,
    /// Enforced numeric and list limits.
    pub guardrails: Guardrails,
}

impl Default for ToolsPolicy {
    fn default() -> Self {
        Self {
            version: 1,
            default_policy: DefaultPolicy::Allow,
            tools: BTreeMap::new(),
            guardrails: Guardrails::default(),
        }
    }
}

impl ToolsPolicy {
    /// Validate the policy per the catalog store's rules.
    ///
    /// # Errors
    ///
    /// [`CatalogError::InvalidPayload`] if `version != 1`, any guardrail
    /// integer is not strictly positive, or any `tools` key names a tool
    /// outside [`KNOWN_TOOLS`].
    pub fn validate(&self) -> CatalogResult<()> {
        if self.version != 1 {
            return Err(CatalogError::InvalidPayload(format!(
                "unsupported tools policy version {}",
                self.version
            )));
        }

        let g = &self.guardrails;
        let positive_fields: [(&str, u64); 6] = [
            ("maxReadBytes", g.max_read_bytes),
            ("maxWriteBytes", g.max_write_bytes),
            ("execTimeoutMs", g.exec_timeout_ms),
            ("maxExecOutputBytes", g.max_exec_output_bytes),
            ("webTimeoutMs", g.web_timeout_ms),
            ("webMaxBytes", g.web_max_bytes),
        ];
        for (name, value) in positive_fields {
            if value == 0 {
                return Err(CatalogError::InvalidPayload(format!(
                    "guardrail {name} must be > 0"
                )));
            }
        }
        if g.max_processes_per_session == 0 {
            return Err(CatalogError::InvalidPayload(
                "guardrail maxProcessesPerSession must be > 0".to_string(),
            ));
        }
        if g.max_tool_calls_per_minute == 0 {
            return Err(CatalogError::InvalidPayload(
                "guardrail maxToolCallsPerMinute must be > 0".to_string(),
            ));
        }

        for tool_id in self.tools.keys() {
            if !KNOWN_TOOLS.contains(&tool_id.as_str()) {
                return Err(CatalogError::InvalidPayload(format!(
                    "unknown tool id {tool_id:?}"
                )));
            }
        }

        Ok(())
    }
}

/// Store for per-agent `tools/tools.json` files.
#[derive(Debug, Clone)]
pub struct ToolsPolicyStore {
    agents_root: PathBuf,
}

impl ToolsPolicyStore {
    /// Create a store rooted at `<workspaceRoot>/agents`.
    #[must_use]
    pub fn new(agents_root: impl Into<PathBuf>) -> Self {
        Self {
            agents_root: agents_root.into(),
        }
    }

    fn policy_path(&self, agent_id: &AgentId) -> PathBuf {
        self.agents_root
            .join(agent_id.as_str())
            .join("tools")
            .join("tools.json")
    }

    /// Write the default policy for `agent_id`, creating the `tools/`
    /// directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_default(&self, agent_id: &AgentId) -> CatalogResult<ToolsPolicy> {
        let policy = ToolsPolicy::default();
        self.write(agent_id, &policy)?;
        Ok(policy)
    }

    /// Write `policy` to disk after validating it.
    ///
    /// # Errors
    ///
    /// [`CatalogError::InvalidPayload`] if the policy fails validation;
    /// otherwise a storage failure.
    pub fn write(&self, agent_id: &AgentId, policy: &ToolsPolicy) -> CatalogResult<()> {
        policy.validate()?;
        let path = self.policy_path(agent_id);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(policy)
            .map_err(|e| CatalogError::StorageFailure(e.to_string()))?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Read `agent_id`'s policy, writing and returning the default if the
    /// file does not yet exist.
    ///
    /// # Errors
    ///
    /// [`CatalogError::InvalidPayload`] if the on-disk policy fails
    /// validation; otherwise a storage failure.
    pub fn read(&self, agent_id: &AgentId) -> CatalogResult<ToolsPolicy> {
        let path = self.policy_path(agent_id);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return self.write_default(agent_id);
            },
            Err(e) => return Err(CatalogError::StorageFailure(e.to_string())),
        };

        let policy: ToolsPolicy = serde_json::from_str(&content)
            .map_err(|e| CatalogError::InvalidPayload(format!("malformed tools.json: {e}")))?;
        policy.validate()?;
        Ok(policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, ToolsPolicyStore, AgentId) {
        let dir = TempDir::new().unwrap();
        let agent_id = AgentId::new("a1").unwrap();
        std::fs::create_dir_all(dir.path().join("a1")).unwrap();
        let store = ToolsPolicyStore::new(dir.path());
        (dir, store, agent_id)
    }

    #[test]
    fn missing_file_returns_and_writes_default() {
        let (dir, store, agent_id) = store();
        let policy = store.read(&agent_id).unwrap();
        assert_eq!(policy.default_policy, DefaultPolicy::Allow);
        assert!(dir.path().join("a1/tools/tools.json").exists());
    }

    #[test]
    fn validate_rejects_wrong_version() {
        let mut policy = ToolsPolicy::default();
        policy.version = 2;
        assert!(policy.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_guardrail() {
        let mut policy = ToolsPolicy::default();
        policy.guardrails.max_read_bytes = 0;
        assert!(policy.validate().is_err());
    }

    #[test]
    fn validate_rejects_unknown_tool() {
        let mut policy = ToolsPolicy::default();
        policy
            .tools
            .insert("not.a.real.tool".to_string(), ToolPolicyEntry { allow: true });
        assert!(policy.validate().is_err());
    }

    #[test]
    fn validate_accepts_known_tool_override() {
        let mut policy = ToolsPolicy::default();
        policy
            .tools
            .insert("runtime.exec".to_string(), ToolPolicyEntry { allow: false });
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn write_then_read_round_trips() {
        let (_dir, store, agent_id) = store();
        let mut policy = ToolsPolicy::default();
        policy.default_policy = DefaultPolicy::Deny;
        store.write(&agent_id, &policy).unwrap();

        let loaded = store.read(&agent_id).unwrap();
        assert_eq!(loaded.default_policy, DefaultPolicy::Deny);
    }
}

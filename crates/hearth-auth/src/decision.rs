//! Policy → explicit override → default-policy authorization decisions.
//!
//! Simplified from the teacher's `SecurityInterceptor`, which layers policy,
//! capability tokens, a budget tracker, and human approval with intersection
//! semantics: spec.md's model carries none of that machinery (no
//! capabilities, no budgets, no human-in-the-loop approval — "no sandboxing
//! beyond path confinement and command denylist"), so this is the policy
//! layer alone, reduced to its lookup-then-decide core.

use hearth_catalog::{DefaultPolicy, ToolsPolicy, ToolsPolicyStore};
use hearth_core::AgentId;
use serde::{Deserialize, Serialize};

use crate::error::AuthResult;

/// The `{code, message, retryable}` shape carried by a denied decision,
/// matching the wire contract every tool result reports errors through.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationError {
    /// Always `"tool_forbidden"` for a policy denial.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Always `false`: a forbidden tool does not become allowed by retrying.
    pub retryable: bool,
}

impl AuthorizationError {
    fn tool_forbidden(tool_id: &str) -> Self {
        Self {
            code: "tool_forbidden".to_string(),
            message: format!("{tool_id} is forbidden by the agent's tools policy"),
            retryable: false,
        }
    }
}

/// The outcome of authorizing one `(agentId, toolId)` pair.
#[derive(Debug, Clone)]
pub struct AuthorizationDecision {
    /// Whether the call may proceed.
    pub allowed: bool,
    /// Present when `allowed` is `false`.
    pub error: Option<AuthorizationError>,
    /// The agent's full policy, so the executor can read guardrails.
    pub policy: ToolsPolicy,
}

/// Decide whether `agent_id` may invoke `tool_id`, loading the policy via
/// the catalog's [`ToolsPolicyStore`].
///
/// Decision: an explicit per-tool `allow` entry wins; otherwise
/// `policy.defaultPolicy` applies.
///
/// # Errors
///
/// Propagates [`crate::error::AuthError`] if the policy cannot be loaded.
pub fn authorize(
    tools_policy_store: &ToolsPolicyStore,
    agent_id: &AgentId,
    tool_id: &str,
) -> AuthResult<AuthorizationDecision> {
    let policy = tools_policy_store.read(agent_id)?;

    let allowed = match policy.tools.get(tool_id) {
        Some(entry) => entry.allow,
        None => matches!(policy.default_policy, DefaultPolicy::Allow),
    };

    let error = if allowed {
        None
    } else {
        tracing::debug!(agent_id = %agent_id, tool_id, "tool denied by policy");
        Some(AuthorizationError::tool_forbidden(tool_id))
    };

    Ok(AuthorizationDecision {
        allowed,
        error,
        policy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_catalog::ToolPolicyEntry;
    use tempfile::TempDir;

    fn store_with_agent() -> (TempDir, ToolsPolicyStore, AgentId) {
        let dir = TempDir::new().unwrap();
        let agent_id = AgentId::new("a1").unwrap();
        std::fs::create_dir_all(dir.path().join("a1")).unwrap();
        (dir, ToolsPolicyStore::new(dir.path()), agent_id)
    }

    #[test]
    fn default_allow_policy_allows_unlisted_tool() {
        let (_dir, store, agent_id) = store_with_agent();
        let decision = authorize(&store, &agent_id, "files.read").unwrap();
        assert!(decision.allowed);
        assert!(decision.error.is_none());
    }

    #[test]
    fn explicit_deny_overrides_default_allow() {
        let (_dir, store, agent_id) = store_with_agent();
        let mut policy = store.read(&agent_id).unwrap();
        policy
            .tools
            .insert("runtime.exec".to_string(), ToolPolicyEntry { allow: false });
        store.write(&agent_id, &policy).unwrap();

        let decision = authorize(&store, &agent_id, "runtime.exec").unwrap();
        assert!(!decision.allowed);
        let error = decision.error.unwrap();
        assert_eq!(error.code, "tool_forbidden");
        assert!(!error.retryable);
    }

    #[test]
    fn explicit_allow_overrides_default_deny() {
        let (_dir, store, agent_id) = store_with_agent();
        let mut policy = store.read(&agent_id).unwrap();
        policy.default_policy = DefaultPolicy::Deny;
        policy
            .tools
            .insert("agents.list".to_string(), ToolPolicyEntry { allow: true });
        store.write(&agent_id, &policy).unwrap();

        let decision = authorize(&store, &agent_id, "agents.list").unwrap();
        assert!(decision.allowed);
    }

    #[test]
    fn default_deny_blocks_unlisted_tool() {
        let (_dir, store, agent_id) = store_with_agent();
        let mut policy = store.read(&agent_id).unwrap();
        policy.default_policy = DefaultPolicy::Deny;
        store.write(&agent_id, &policy).unwrap();

        let decision = authorize(&store, &agent_id, "runtime.exec").unwrap();
        assert!(!decision.allowed);
    }
}

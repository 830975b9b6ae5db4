//! Validated newtype identifiers for agents and sessions.

use crate::error::{CoreError, CoreResult};
use crate::{MAX_AGENT_ID_LEN, MAX_SESSION_ID_LEN};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Characters allowed in an id besides ASCII alphanumerics.
const ALLOWED_EXTRA: &[char] = &['-', '_', '.'];

fn is_valid_id(s: &str, max_len: usize) -> bool {
    !s.is_empty()
        && s.len() <= max_len
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || ALLOWED_EXTRA.contains(&c))
}

/// Stable agent identifier: alphanumeric, `-`, `_`, `.`, length <= 120.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    /// Validate and construct an [`AgentId`].
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidAgentId`] if `s` is empty, too long, or
    /// contains characters outside `[A-Za-z0-9_.-]`.
    pub fn new(s: impl Into<String>) -> CoreResult<Self> {
        let s = s.into();
        if is_valid_id(&s, MAX_AGENT_ID_LEN) {
            Ok(Self(s))
        } else {
            Err(CoreError::InvalidAgentId(s))
        }
    }

    /// Borrow the inner string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AgentId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Session identifier, `session-<random128>` by default, validated like
/// [`AgentId`] but with a longer maximum length (160).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Validate and construct a [`SessionId`].
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidSessionId`] if `s` is empty, too long, or
    /// contains characters outside `[A-Za-z0-9_.-]`.
    pub fn new(s: impl Into<String>) -> CoreResult<Self> {
        let s = s.into();
        if is_valid_id(&s, MAX_SESSION_ID_LEN) {
            Ok(Self(s))
        } else {
            Err(CoreError::InvalidSessionId(s))
        }
    }

    /// Generate a fresh `session-<random128>` id.
    #[must_use]
    pub fn generate() -> Self {
        let raw = uuid::Uuid::new_v4().simple().to_string();
        // uuid v4 simple form is 128 bits of randomness encoded as 32 hex chars.
        Self(format!("session-{raw}"))
    }

    /// Borrow the inner string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 8 characters, used for the default session title.
    #[must_use]
    pub fn short(&self) -> String {
        self.0.chars().take(8).collect()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SessionId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_id_accepts_valid_chars() {
        assert!(AgentId::new("agent-1_2.3").is_ok());
    }

    #[test]
    fn agent_id_rejects_empty() {
        assert!(AgentId::new("").is_err());
    }

    #[test]
    fn agent_id_rejects_too_long() {
        let long = "a".repeat(MAX_AGENT_ID_LEN + 1);
        assert!(AgentId::new(long).is_err());
    }

    #[test]
    fn agent_id_rejects_bad_chars() {
        assert!(AgentId::new("agent/1").is_err());
        assert!(AgentId::new("agent 1").is_err());
    }

    #[test]
    fn session_id_generate_has_prefix() {
        let id = SessionId::generate();
        assert!(id.as_str().starts_with("session-"));
        assert_eq!(id.short(), "session-");
    }

    #[test]
    fn session_id_rejects_too_long() {
        let long = "s".repeat(MAX_SESSION_ID_LEN + 1);
        assert!(SessionId::new(long).is_err());
    }
}

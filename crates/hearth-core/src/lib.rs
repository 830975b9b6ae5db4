//! Shared identifiers, event types, and data model for the agent session
//! orchestrator.
//!
//! This crate has no I/O of its own — it defines the wire-shape types that
//! the storage, catalog, tools, and orchestrator crates all share, plus the
//! validation rules for agent/session ids that every store enforces at its
//! boundary.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]

mod error;
mod ids;
mod event;
mod message;

pub use error::{CoreError, CoreResult};
pub use ids::{AgentId, SessionId};
pub use event::{Event, EventPayload, RunControlAction, RunStage, ToolErrorPayload, ToolResultPayload};
pub use message::{AttachmentRef, MessageRole, MessageSegment};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum length of an agent id.
pub const MAX_AGENT_ID_LEN: usize = 120;
/// Maximum length of a session id.
pub const MAX_SESSION_ID_LEN: usize = 160;
/// Maximum length of a session title.
pub const MAX_SESSION_TITLE_LEN: usize = 240;

/// A stored agent profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSummary {
    /// Stable identifier.
    pub id: AgentId,
    /// Display name.
    pub display_name: String,
    /// Free-text role.
    pub role: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Selected model id, if any.
    pub selected_model: Option<String>,
}

/// A derived (never stored) view of a session, recomputed on every load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionSummary {
    /// Session id.
    pub id: String,
    /// Title, defaulted to `Session <first8>` at creation time.
    pub title: String,
    /// Parent session id, if this session was spawned as a sub-session.
    pub parent_session_id: Option<String>,
    /// Number of message events in the log.
    pub message_count: usize,
    /// First non-empty text segment of the latest message, truncated to 120 chars.
    pub last_message_preview: Option<String>,
    /// Max `createdAt` across all events.
    pub updated_at: DateTime<Utc>,
}

impl SessionSummary {
    /// A display title, falling back to `Session <first8>` of the id.
    ///
    /// The title field is already defaulted at session-creation time, so this
    /// is mostly relevant for summaries built outside that path (e.g. tests).
    #[must_use]
    pub fn display_title(&self) -> String {
        if self.title.trim().is_empty() {
            let short_id: String = self.id.chars().take(8).collect();
            format!("Session {short_id}")
        } else {
            self.title.clone()
        }
    }
}

/// Truncate a string to `max_chars`, on a char boundary.
#[must_use]
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    s.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_title_falls_back_to_short_id() {
        let summary = SessionSummary {
            id: "abc123459abcdef".to_string(),
            title: String::new(),
            parent_session_id: None,
            message_count: 0,
            last_message_preview: None,
            updated_at: Utc::now(),
        };
        assert_eq!(summary.display_title(), "Session abc12345");
    }

    #[test]
    fn truncate_chars_respects_char_boundaries() {
        let s = "hello world";
        assert_eq!(truncate_chars(s, 5), "hello");
        assert_eq!(truncate_chars(s, 100), s);
    }
}

//! Session event log entries.
//!
//! An [`Event`] is the unit of durability for a session: every mutation the
//! orchestrator makes is expressed as one or more events appended to the
//! session's log. Readers sort by `created_at` on load, so the in-memory
//! representation here carries a timestamp on every variant rather than
//! relying on file order.

use crate::message::{MessageRole, MessageSegment};
use crate::{AgentId, SessionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stage of an in-flight or completed model turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RunStage {
    /// The model has been asked to respond and is not yet streaming.
    Thinking,
    /// The turn involves a search-like request.
    Searching,
    /// Assistant text is streaming.
    Responding,
    /// The session was paused via `controlSession(pause)`.
    Paused,
    /// The turn was interrupted via `controlSession(interrupt)`.
    Interrupted,
    /// The turn completed normally.
    Done,
}

/// The action requested by a `controlSession` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RunControlAction {
    /// Pause the session.
    Pause,
    /// Resume a paused session.
    Resume,
    /// Interrupt the in-flight turn.
    Interrupt,
}

/// Outcome of a completed tool invocation, as recorded in a `toolResult` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResultPayload {
    /// The tool id that was invoked.
    pub tool: String,
    /// Whether the call succeeded.
    pub ok: bool,
    /// Return data, present on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// Error code, message and retryability, present on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ToolErrorPayload>,
    /// Wall-clock milliseconds elapsed inside the executor.
    pub duration_ms: u64,
}

/// Structured error attached to a failed tool result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolErrorPayload {
    /// Closed error code, e.g. `path_not_allowed`.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Whether the caller may usefully retry.
    pub retryable: bool,
}

/// The one-of payload carried by an [`Event`], discriminated by `type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EventPayload {
    /// First event of every session log.
    SessionCreated {
        /// Session title.
        title: String,
        /// Parent session id, if this session was spawned as a sub-session.
        #[serde(skip_serializing_if = "Option::is_none")]
        parent_session_id: Option<String>,
    },
    /// A user, assistant, or system message.
    Message {
        /// Who authored the message.
        role: MessageRole,
        /// Ordered content segments.
        segments: Vec<MessageSegment>,
        /// Id of the user on whose behalf this message was recorded.
        user_id: String,
    },
    /// A change in run stage.
    RunStatus {
        /// The new stage.
        stage: RunStage,
        /// Short label, e.g. `"Error"` or `"Resumed"`.
        label: String,
        /// Longer free-text detail.
        details: String,
        /// Cumulative streamed text, present on throttled progress events.
        #[serde(skip_serializing_if = "Option::is_none")]
        expanded_text: Option<String>,
    },
    /// A pause/resume/interrupt request.
    RunControl {
        /// The requested action.
        action: RunControlAction,
    },
    /// Recorded on the parent when a sub-session is spawned.
    SubSession {
        /// The child session id.
        session_id: String,
        /// The child session's title.
        title: String,
    },
    /// Recorded before a tool is dispatched.
    ToolCall {
        /// The tool id.
        tool: String,
        /// Arguments passed to the tool.
        arguments: serde_json::Value,
        /// Optional free-text reason supplied by the model.
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    /// Recorded after a tool call completes.
    ToolResult(ToolResultPayload),
}

/// One durable entry in a session's event log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Unique event id.
    pub id: Uuid,
    /// Owning agent.
    pub agent_id: AgentId,
    /// Owning session.
    pub session_id: SessionId,
    /// UTC creation timestamp.
    pub created_at: DateTime<Utc>,
    /// The type-specific payload.
    #[serde(flatten)]
    pub payload: EventPayload,
}

impl Event {
    /// Construct a new event with a freshly generated id and the given
    /// timestamp.
    #[must_use]
    pub fn new(
        agent_id: AgentId,
        session_id: SessionId,
        created_at: DateTime<Utc>,
        payload: EventPayload,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            agent_id,
            session_id,
            created_at,
            payload,
        }
    }

    /// `true` if this is the `sessionCreated` event.
    #[must_use]
    pub fn is_session_created(&self) -> bool {
        matches!(self.payload, EventPayload::SessionCreated { .. })
    }

    /// `true` if this is a `message` event.
    #[must_use]
    pub fn is_message(&self) -> bool {
        matches!(self.payload, EventPayload::Message { .. })
    }

    /// The message's first non-empty text segment, if this is a message event.
    #[must_use]
    pub fn first_text_segment(&self) -> Option<&str> {
        match &self.payload {
            EventPayload::Message { segments, .. } => {
                segments.iter().find_map(MessageSegment::as_text)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageRole;

    fn ids() -> (AgentId, SessionId) {
        (
            AgentId::new("agent-1").unwrap(),
            SessionId::new("session-1").unwrap(),
        )
    }

    #[test]
    fn session_created_round_trips_through_json() {
        let (agent_id, session_id) = ids();
        let event = Event::new(
            agent_id,
            session_id,
            Utc::now(),
            EventPayload::SessionCreated {
                title: "T".to_string(),
                parent_session_id: None,
            },
        );
        let json = serde_json::to_string(&event).unwrap();
        let back: Event = serde_json::from_str(&json).unwrap();
        assert!(back.is_session_created());
    }

    #[test]
    fn first_text_segment_finds_first_text() {
        let (agent_id, session_id) = ids();
        let event = Event::new(
            agent_id,
            session_id,
            Utc::now(),
            EventPayload::Message {
                role: MessageRole::User,
                segments: vec![MessageSegment::Text {
                    text: "hello".to_string(),
                }],
                user_id: "u".to_string(),
            },
        );
        assert_eq!(event.first_text_segment(), Some("hello"));
    }

    #[test]
    fn non_message_event_has_no_text_segment() {
        let (agent_id, session_id) = ids();
        let event = Event::new(
            agent_id,
            session_id,
            Utc::now(),
            EventPayload::RunStatus {
                stage: RunStage::Done,
                label: String::new(),
                details: String::new(),
                expanded_text: None,
            },
        );
        assert_eq!(event.first_text_segment(), None);
    }
}

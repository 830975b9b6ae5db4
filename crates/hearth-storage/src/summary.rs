//! Derives a [`SessionSummary`] from an ordered event slice.
//!
//! The summary is never stored as its own record; it is recomputed on every
//! load from the event log, per the ownership rule in §3 of the design.

use chrono::{DateTime, Utc};
use hearth_core::{truncate_chars, Event, EventPayload, SessionSummary};

const PREVIEW_MAX_CHARS: usize = 120;

/// Compute the derived summary for a session's events.
///
/// `events` must contain at least one event, and the first must be a
/// `sessionCreated` event; callers enforce that invariant at load time.
#[must_use]
pub fn compute_summary(session_id: &str, events: &[Event]) -> Option<SessionSummary> {
    let first = events.first()?;
    let EventPayload::SessionCreated {
        title,
        parent_session_id,
    } = &first.payload
    else {
        return None;
    };

    let message_count = events.iter().filter(|e| e.is_message()).count();

    let last_message_preview = events
        .iter()
        .rev()
        .filter(|e| e.is_message())
        .find_map(|e| e.first_text_segment())
        .map(|text| truncate_chars(text, PREVIEW_MAX_CHARS));

    let updated_at: DateTime<Utc> = events
        .iter()
        .map(|e| e.created_at)
        .max()
        .unwrap_or(first.created_at);

    Some(SessionSummary {
        id: session_id.to_string(),
        title: title.clone(),
        parent_session_id: parent_session_id.clone(),
        message_count,
        last_message_preview,
        updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_core::{AgentId, MessageRole, MessageSegment, RunStage, SessionId};

    fn agent() -> AgentId {
        AgentId::new("a1").unwrap()
    }

    fn session() -> SessionId {
        SessionId::new("s1").unwrap()
    }

    #[test]
    fn summary_counts_messages_and_tracks_latest_preview() {
        let created = Event::new(
            agent(),
            session(),
            Utc::now(),
            EventPayload::SessionCreated {
                title: "T".to_string(),
                parent_session_id: None,
            },
        );
        let msg1 = Event::new(
            agent(),
            session(),
            Utc::now(),
            EventPayload::Message {
                role: MessageRole::User,
                segments: vec![MessageSegment::Text {
                    text: "hi".to_string(),
                }],
                user_id: "u".to_string(),
            },
        );
        let msg2 = Event::new(
            agent(),
            session(),
            Utc::now(),
            EventPayload::Message {
                role: MessageRole::Assistant,
                segments: vec![MessageSegment::Text {
                    text: "hello there".to_string(),
                }],
                user_id: "agent".to_string(),
            },
        );
        let done = Event::new(
            agent(),
            session(),
            Utc::now(),
            EventPayload::RunStatus {
                stage: RunStage::Done,
                label: String::new(),
                details: String::new(),
                expanded_text: None,
            },
        );

        let summary = compute_summary("s1", &[created, msg1, msg2, done]).unwrap();
        assert_eq!(summary.title, "T");
        assert_eq!(summary.message_count, 2);
        assert_eq!(summary.last_message_preview.as_deref(), Some("hello there"));
    }

    #[test]
    fn summary_none_when_first_event_is_not_session_created() {
        let msg = Event::new(
            agent(),
            session(),
            Utc::now(),
            EventPayload::Message {
                role: MessageRole::User,
                segments: vec![],
                user_id: "u".to_string(),
            },
        );
        assert!(compute_summary("s1", &[msg]).is_none());
    }
}

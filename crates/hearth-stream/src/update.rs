//! The ordered update record a subscription emits, and its server-sent-events
//! wire encoding.

use hearth_core::{Event, SessionSummary};

/// One update emitted by a session's live subscription, in cursor order.
#[derive(Debug, Clone)]
pub enum StreamUpdate {
    /// First update of a subscription: the session's current summary and
    /// the cursor (event count) to resume from.
    SessionReady {
        /// The session's summary as of this poll.
        summary: SessionSummary,
        /// Number of events already in the log; the next `sessionEvent`'s
        /// cursor will be this value plus one.
        cursor: usize,
    },
    /// One newly appended event.
    SessionEvent {
        /// The event's 1-based position in the log.
        cursor: usize,
        /// The session's summary as of this poll.
        summary: SessionSummary,
        /// The event itself.
        event: Event,
    },
    /// Sent when no new event has arrived for the configured heartbeat
    /// interval, so idle subscribers can detect a still-live connection.
    Heartbeat,
    /// The session was deleted out from under the subscription; terminal.
    SessionClosed {
        /// Human-readable explanation, `"Session was deleted."` per spec.
        message: String,
    },
    /// An unexpected error occurred reading the log; terminal.
    SessionError {
        /// Human-readable explanation, `"Failed to stream session updates."`.
        message: String,
    },
}

impl StreamUpdate {
    /// The `event: <kind>` name this update is encoded under.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            StreamUpdate::SessionReady { .. } => "sessionReady",
            StreamUpdate::SessionEvent { .. } => "sessionEvent",
            StreamUpdate::Heartbeat => "heartbeat",
            StreamUpdate::SessionClosed { .. } => "sessionClosed",
            StreamUpdate::SessionError { .. } => "sessionError",
        }
    }

    /// The cursor this update advances to, if any. Updates with no cursor
    /// of their own (heartbeat, closed, error) reuse the last known cursor
    /// for their SSE `id:` line.
    #[must_use]
    pub fn cursor(&self) -> Option<usize> {
        match self {
            StreamUpdate::SessionReady { cursor, .. } | StreamUpdate::SessionEvent { cursor, .. } => {
                Some(*cursor)
            },
            _ => None,
        }
    }

    /// The JSON payload carried in the `data:` line(s), `{}`-shaped per kind.
    fn data(&self) -> serde_json::Value {
        match self {
            StreamUpdate::SessionReady { summary, cursor } => {
                serde_json::json!({ "summary": summary, "cursor": cursor })
            },
            StreamUpdate::SessionEvent { cursor, summary, event } => {
                serde_json::json!({ "cursor": cursor, "summary": summary, "event": event })
            },
            StreamUpdate::Heartbeat => serde_json::json!({}),
            StreamUpdate::SessionClosed { message } | StreamUpdate::SessionError { message } => {
                serde_json::json!({ "message": message })
            },
        }
    }
}

/// Encode `update` as one server-sent-events frame: `event:`/`id:`/`data:`
/// lines followed by a blank separator. `last_cursor` backfills the `id:`
/// line for updates that carry no cursor of their own.
#[must_use]
pub fn encode_sse(update: &StreamUpdate, last_cursor: usize) -> String {
    let cursor = update.cursor().unwrap_or(last_cursor);
    let data = update.data().to_string();
    format!("event: {}\nid: {}\ndata: {}\n\n", update.kind(), cursor, data)
}

/// The `: stream-open` comment line sent once before a subscription's first
/// update, keeping intermediaries from buffering an apparently-empty
/// response.
#[must_use]
pub fn stream_open_comment() -> &'static str {
    ": stream-open\n\n"
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn summary() -> SessionSummary {
        SessionSummary {
            id: "s1".to_string(),
            title: "T".to_string(),
            parent_session_id: None,
            message_count: 0,
            last_message_preview: None,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn encodes_session_ready_with_its_own_cursor() {
        let update = StreamUpdate::SessionReady { summary: summary(), cursor: 3 };
        let frame = encode_sse(&update, 0);
        assert!(frame.starts_with("event: sessionReady\nid: 3\ndata: "));
        assert!(frame.ends_with("\n\n"));
    }

    #[test]
    fn heartbeat_reuses_last_cursor() {
        let frame = encode_sse(&StreamUpdate::Heartbeat, 7);
        assert!(frame.starts_with("event: heartbeat\nid: 7\ndata: {}"));
    }

    #[test]
    fn session_closed_carries_its_message() {
        let update = StreamUpdate::SessionClosed { message: "Session was deleted.".to_string() };
        let frame = encode_sse(&update, 2);
        assert!(frame.contains("\"message\":\"Session was deleted.\""));
    }
}

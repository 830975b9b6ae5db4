//! Configuration the orchestrator's `postMessage` algorithm is parameterized
//! over, rather than hardcoding (spec open question: heartbeat cadence and
//! progress-persist thresholds should be configuration, not literals).

use std::time::Duration;

/// Marker line prefixed to a session's bootstrap system message, used to
/// detect whether bootstrap has already run for a channel.
pub const BOOTSTRAP_MARKER: &str = "[agent_session_context_bootstrap_v1]";

/// Keywords that flag a user message as search-like, triggering the
/// optional `runStatus(searching)` event in the initial batch.
pub const SEARCH_KEYWORDS: &[&str] = &[
    "search", "find", "google", "lookup", "research", "найди", "поиск", "исследуй",
];

/// Tunables for `postMessage`'s streaming-progress persistence throttle.
#[derive(Debug, Clone)]
pub struct PostMessageConfig {
    /// Minimum new characters since the last persisted progress event
    /// before persisting another one.
    pub progress_persist_min_chars: usize,
    /// Minimum wall-clock time since the last persisted progress event
    /// before persisting another one.
    pub progress_persist_min_interval: Duration,
}

impl Default for PostMessageConfig {
    fn default() -> Self {
        Self {
            progress_persist_min_chars: 24,
            progress_persist_min_interval: Duration::from_millis(350),
        }
    }
}

/// `true` if `content` looks like a search-style request: it already has
/// attachments, or its lowercased text contains one of [`SEARCH_KEYWORDS`].
#[must_use]
pub fn looks_like_search(content: &str, has_attachments: bool) -> bool {
    if has_attachments {
        return true;
    }
    let lower = content.to_lowercase();
    SEARCH_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_keyword_case_insensitively() {
        assert!(looks_like_search("Please Search the web", false));
    }

    #[test]
    fn attachments_alone_trigger_search_stage() {
        assert!(looks_like_search("hello", true));
    }

    #[test]
    fn plain_message_does_not_trigger_search_stage() {
        assert!(!looks_like_search("hello there", false));
    }
}

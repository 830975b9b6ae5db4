//! Tunables the poll loop is parameterized over (spec open question:
//! poll period and heartbeat cadence should be configuration, not literals).

use std::time::Duration;

/// Configuration for one session's live-update poll loop.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// How often the event log is re-read for new events.
    pub poll_interval: Duration,
    /// Wall-clock time since the last update before a heartbeat is sent.
    pub heartbeat_interval: Duration,
    /// Capacity of the outbound update channel (backpressure bound).
    pub channel_capacity: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(250),
            heartbeat_interval: Duration::from_secs(12),
            channel_capacity: 128,
        }
    }
}

//! Per-session in-memory run state.
//!
//! Re-architected from a per-orchestrator map into a small value-typed
//! struct held in the orchestrator's own session table: one entry per
//! session that has ever run a turn, dropped implicitly on shutdown, never
//! the event log's concern (the log is never cached).

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use tokio::sync::Mutex;

/// Bookkeeping for the chunk-throttled progress-persist rule.
pub struct StreamBuffer {
    /// Cumulative assistant text streamed so far this turn.
    pub text: String,
    /// Character count of `text` at the last persisted progress event.
    pub last_persisted_len: usize,
    /// When the last progress event was persisted, `None` before the first.
    pub last_persisted_at: Option<Instant>,
}

impl StreamBuffer {
    fn reset() -> Self {
        Self {
            text: String::new(),
            last_persisted_len: 0,
            last_persisted_at: None,
        }
    }
}

/// One session's in-flight run state: an interruption flag cheap enough to
/// flip from `controlSession` while a turn is active, an `op_lock` held for
/// the whole `postMessage` call to serialize turns on the same session, and
/// the streaming buffer `onChunk` accumulates into.
pub struct SessionRuntime {
    /// Held for the duration of an active `postMessage` call; a second call
    /// for the same session blocks here rather than interleaving.
    pub op_lock: Mutex<()>,
    /// Set by `controlSession(interrupt)`; the next chunk returns `false`.
    pub interrupted: AtomicBool,
    /// Streaming buffer for the turn currently in flight (if any).
    pub buffer: Mutex<StreamBuffer>,
}

impl Default for SessionRuntime {
    fn default() -> Self {
        Self {
            op_lock: Mutex::new(()),
            interrupted: AtomicBool::new(false),
            buffer: Mutex::new(StreamBuffer::reset()),
        }
    }
}

impl SessionRuntime {
    /// Reset interruption and streaming state for a new turn. Called while
    /// holding `op_lock` at the start of `postMessage`.
    pub async fn reset_for_new_turn(&self) {
        self.interrupted.store(false, Ordering::SeqCst);
        let mut buffer = self.buffer.lock().await;
        *buffer = StreamBuffer::reset();
    }

    /// `true` if `controlSession(interrupt)` has fired since the last reset.
    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }
}

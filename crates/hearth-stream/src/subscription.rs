//! The per-subscription poll task: reads the event log every
//! [`StreamConfig::poll_interval`], turning new events into ordered
//! [`StreamUpdate`]s.
//!
//! Generalizes the teacher's `subscribe_events_impl` (forward a live
//! `broadcast::Receiver` into a subscription sink) into a durable
//! cursor-replay loop: a stalled or reconnecting subscriber resumes from its
//! last cursor by re-reading the log, rather than losing history the way a
//! broadcast channel would on lag.

use std::sync::Arc;
use std::time::Instant;

use hearth_core::{AgentId, SessionId};
use hearth_storage::{EventLogStore, StorageError};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::StreamConfig;
use crate::update::StreamUpdate;

/// Spawn the poll task for one session subscription, returning the receiving
/// end of its update channel. The task exits on `sessionClosed`/`sessionError`
/// or when `cancel` fires; it sends nothing further after either.
pub fn spawn_session_stream(
    event_log: Arc<EventLogStore>,
    agent_id: AgentId,
    session_id: SessionId,
    config: StreamConfig,
    cancel: CancellationToken,
) -> mpsc::Receiver<StreamUpdate> {
    let (tx, rx) = mpsc::channel(config.channel_capacity);
    tokio::spawn(run(event_log, agent_id, session_id, config, cancel, tx));
    rx
}

/// Send `update`, honoring `cancel` so a stalled receiver cannot block
/// cooperative shutdown indefinitely. Returns `false` if cancellation won the
/// race (the caller should stop producing further updates).
async fn send_blocking(
    tx: &mpsc::Sender<StreamUpdate>,
    update: StreamUpdate,
    cancel: &CancellationToken,
) -> bool {
    tokio::select! {
        () = cancel.cancelled() => false,
        result = tx.send(update) => result.is_ok(),
    }
}

async fn run(
    event_log: Arc<EventLogStore>,
    agent_id: AgentId,
    session_id: SessionId,
    config: StreamConfig,
    cancel: CancellationToken,
    tx: mpsc::Sender<StreamUpdate>,
) {
    let mut cursor = 0usize;
    let mut ready_sent = false;
    let mut last_update_at = Instant::now();

    loop {
        tokio::select! {
            () = cancel.cancelled() => {
                debug!(session_id = %session_id, "stream subscription cancelled");
                return;
            },
            () = tokio::time::sleep(config.poll_interval) => {},
        }

        match event_log.load(&agent_id, &session_id) {
            Ok((summary, events)) => {
                if !ready_sent {
                    cursor = events.len();
                    ready_sent = true;
                    last_update_at = Instant::now();
                    if !send_blocking(&tx, StreamUpdate::SessionReady { summary, cursor }, &cancel).await {
                        return;
                    }
                    continue;
                }

                if events.len() > cursor {
                    for event in &events[cursor..] {
                        cursor += 1;
                        last_update_at = Instant::now();
                        let update = StreamUpdate::SessionEvent {
                            cursor,
                            summary: summary.clone(),
                            event: event.clone(),
                        };
                        if !send_blocking(&tx, update, &cancel).await {
                            return;
                        }
                    }
                } else if last_update_at.elapsed() >= config.heartbeat_interval {
                    last_update_at = Instant::now();
                    // Heartbeats alone are newest-wins: a full channel just
                    // drops this one rather than blocking event delivery.
                    let _ = tx.try_send(StreamUpdate::Heartbeat);
                }
            },
            Err(StorageError::SessionNotFound(_)) => {
                let _ = send_blocking(
                    &tx,
                    StreamUpdate::SessionClosed { message: "Session was deleted.".to_string() },
                    &cancel,
                )
                .await;
                return;
            },
            Err(e) => {
                debug!(session_id = %session_id, error = %e, "stream poll failed");
                let _ = send_blocking(
                    &tx,
                    StreamUpdate::SessionError { message: "Failed to stream session updates.".to_string() },
                    &cancel,
                )
                .await;
                return;
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use hearth_core::{Event, EventPayload};
    use tempfile::TempDir;

    fn store() -> (TempDir, EventLogStore, AgentId, SessionId) {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("a1")).unwrap();
        let store = EventLogStore::new(dir.path());
        (dir, store, AgentId::new("a1").unwrap(), SessionId::new("s1").unwrap())
    }

    fn fast_config() -> StreamConfig {
        StreamConfig {
            poll_interval: std::time::Duration::from_millis(5),
            heartbeat_interval: std::time::Duration::from_millis(30),
            channel_capacity: 128,
        }
    }

    #[tokio::test]
    async fn emits_ready_then_new_events_in_order() {
        let (_dir, store, agent_id, session_id) = store();
        let created = Event::new(
            agent_id.clone(),
            session_id.clone(),
            Utc::now(),
            EventPayload::SessionCreated { title: "T".to_string(), parent_session_id: None },
        );
        store.create(&agent_id, &session_id, &[created]).unwrap();

        let event_log = Arc::new(store);
        let cancel = CancellationToken::new();
        let mut rx = spawn_session_stream(
            Arc::clone(&event_log),
            agent_id.clone(),
            session_id.clone(),
            fast_config(),
            cancel.clone(),
        );

        let first = rx.recv().await.unwrap();
        assert!(matches!(first, StreamUpdate::SessionReady { cursor: 1, .. }));

        let msg = Event::new(
            agent_id.clone(),
            session_id.clone(),
            Utc::now(),
            EventPayload::Message {
                role: hearth_core::MessageRole::User,
                segments: vec![],
                user_id: "u".to_string(),
            },
        );
        event_log.append(&agent_id, &session_id, &[msg]).unwrap();

        let second = rx.recv().await.unwrap();
        assert!(matches!(second, StreamUpdate::SessionEvent { cursor: 2, .. }));

        cancel.cancel();
    }

    #[tokio::test]
    async fn missing_session_emits_closed_and_finishes() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(EventLogStore::new(dir.path()));
        let agent_id = AgentId::new("a1").unwrap();
        let session_id = SessionId::new("missing").unwrap();
        let cancel = CancellationToken::new();

        let mut rx =
            spawn_session_stream(store, agent_id, session_id, fast_config(), cancel.clone());

        let update = rx.recv().await.unwrap();
        assert!(matches!(update, StreamUpdate::SessionClosed { .. }));
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn heartbeat_fires_after_idle_interval() {
        let (_dir, store, agent_id, session_id) = store();
        let created = Event::new(
            agent_id.clone(),
            session_id.clone(),
            Utc::now(),
            EventPayload::SessionCreated { title: "T".to_string(), parent_session_id: None },
        );
        store.create(&agent_id, &session_id, &[created]).unwrap();

        let event_log = Arc::new(store);
        let cancel = CancellationToken::new();
        let mut rx = spawn_session_stream(
            event_log,
            agent_id,
            session_id,
            fast_config(),
            cancel.clone(),
        );

        let ready = rx.recv().await.unwrap();
        assert!(matches!(ready, StreamUpdate::SessionReady { .. }));

        let heartbeat = tokio::time::timeout(std::time::Duration::from_millis(500), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(heartbeat, StreamUpdate::Heartbeat));

        cancel.cancel();
    }
}

//! Event Log Store: one append-only JSONL file per session.
//!
//! Files live at `<agentsRoot>/<agentId>/sessions/<sessionId>.jsonl`, one
//! event per line, UTF-8, each line terminated by `0x0A`. Appends open the
//! file in append mode and write one buffered `write_all` per event, so a
//! crash mid-write leaves every prior line intact.

use hearth_core::{AgentId, Event, SessionId};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::attachment::{persist_attachment, AttachmentUpload};
use crate::error::{StorageError, StorageResult};
use crate::summary::compute_summary;
use hearth_core::AttachmentRef;
use hearth_core::SessionSummary;

/// Store for per-session append-only event logs.
#[derive(Debug, Clone)]
pub struct EventLogStore {
    agents_root: PathBuf,
}

impl EventLogStore {
    /// Create a store rooted at `agents_root` (`<workspaceRoot>/agents`).
    #[must_use]
    pub fn new(agents_root: impl Into<PathBuf>) -> Self {
        Self {
            agents_root: agents_root.into(),
        }
    }

    /// Replace the agents root at runtime (`updateAgentsRootURL`).
    pub fn set_agents_root(&mut self, agents_root: impl Into<PathBuf>) {
        self.agents_root = agents_root.into();
    }

    fn agent_dir(&self, agent_id: &AgentId) -> PathBuf {
        self.agents_root.join(agent_id.as_str())
    }

    fn sessions_dir(&self, agent_id: &AgentId) -> PathBuf {
        self.agent_dir(agent_id).join("sessions")
    }

    fn session_path(&self, agent_id: &AgentId, session_id: &SessionId) -> PathBuf {
        self.sessions_dir(agent_id)
            .join(format!("{session_id}.jsonl"))
    }

    fn assets_dir(&self, agent_id: &AgentId, session_id: &SessionId) -> PathBuf {
        self.sessions_dir(agent_id)
            .join(format!("{session_id}.assets"))
    }

    fn agent_exists(&self, agent_id: &AgentId) -> bool {
        self.agent_dir(agent_id).is_dir()
    }

    fn write_events(path: &Path, events: &[Event], append: bool) -> StorageResult<()> {
        let mut opts = OpenOptions::new();
        opts.write(true);
        if append {
            opts.append(true);
        } else {
            opts.create(true).truncate(true);
        }
        let mut file = opts.open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::SessionNotFound(path.display().to_string())
            } else {
                StorageError::StorageFailure(e.to_string())
            }
        })?;

        for event in events {
            let mut line = serde_json::to_vec(event)
                .map_err(|e| StorageError::StorageFailure(e.to_string()))?;
            line.push(b'\n');
            file.write_all(&line)?;
        }

        Ok(())
    }

    /// Create a session's event log with its initial batch of events (at
    /// least the `sessionCreated` event).
    ///
    /// # Errors
    ///
    /// `agentNotFound` if the agent directory is absent; `invalidPayload` on
    /// an empty batch.
    pub fn create(
        &self,
        agent_id: &AgentId,
        session_id: &SessionId,
        events: &[Event],
    ) -> StorageResult<SessionSummary> {
        if events.is_empty() {
            return Err(StorageError::InvalidPayload(
                "cannot create a session with an empty event batch".to_string(),
            ));
        }
        if !self.agent_exists(agent_id) {
            return Err(StorageError::AgentNotFound(agent_id.to_string()));
        }

        let dir = self.sessions_dir(agent_id);
        std::fs::create_dir_all(&dir)?;

        let path = self.session_path(agent_id, session_id);
        Self::write_events(&path, events, false)?;

        debug!(session_id = %session_id, "session created");

        self.load(agent_id, session_id)
            .map(|(summary, _events)| summary)
    }

    /// Append events to an existing session's log. Never creates the file.
    ///
    /// # Errors
    ///
    /// `sessionNotFound` if the log file does not exist.
    pub fn append(
        &self,
        agent_id: &AgentId,
        session_id: &SessionId,
        events: &[Event],
    ) -> StorageResult<SessionSummary> {
        if events.is_empty() {
            return Err(StorageError::InvalidPayload(
                "cannot append an empty event batch".to_string(),
            ));
        }

        let path = self.session_path(agent_id, session_id);
        if !path.is_file() {
            return Err(StorageError::SessionNotFound(session_id.to_string()));
        }
        Self::write_events(&path, events, true)?;

        self.load(agent_id, session_id)
            .map(|(summary, _events)| summary)
    }

    /// Load every event for a session, sorted by `createdAt`, plus its
    /// derived summary.
    ///
    /// # Errors
    ///
    /// `sessionNotFound` if the file is missing or contains zero parsable
    /// events.
    pub fn load(
        &self,
        agent_id: &AgentId,
        session_id: &SessionId,
    ) -> StorageResult<(SessionSummary, Vec<Event>)> {
        let path = self.session_path(agent_id, session_id);
        let contents = std::fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::SessionNotFound(session_id.to_string())
            } else {
                StorageError::StorageFailure(e.to_string())
            }
        })?;

        let mut events: Vec<Event> = contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str::<Event>(line) {
                Ok(event) => Some(event),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unparsable event log line");
                    None
                },
            })
            .collect();

        if events.is_empty() {
            return Err(StorageError::SessionNotFound(session_id.to_string()));
        }

        events.sort_by_key(|e| e.created_at);

        let summary = compute_summary(session_id.as_str(), &events)
            .ok_or_else(|| StorageError::SessionNotFound(session_id.to_string()))?;

        Ok((summary, events))
    }

    /// Delete a session's log file and its sibling assets directory.
    /// Idempotent: deleting an already-deleted session is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error only if the filesystem operation fails for a reason
    /// other than the path already being absent.
    pub fn delete(&self, agent_id: &AgentId, session_id: &SessionId) -> StorageResult<()> {
        let path = self.session_path(agent_id, session_id);
        if let Err(e) = std::fs::remove_file(&path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                return Err(StorageError::StorageFailure(e.to_string()));
            }
        }

        let assets = self.assets_dir(agent_id, session_id);
        if assets.is_dir() {
            std::fs::remove_dir_all(&assets)?;
        }

        Ok(())
    }

    /// Decode and persist a batch of attachment uploads into the session's
    /// assets directory, returning one [`AttachmentRef`] per upload.
    ///
    /// # Errors
    ///
    /// Returns an error if any upload's base64 content is malformed or
    /// cannot be written to disk.
    pub fn persist_attachments(
        &self,
        agent_id: &AgentId,
        session_id: &SessionId,
        uploads: &[AttachmentUpload],
    ) -> StorageResult<Vec<AttachmentRef>> {
        let assets_dir = self.assets_dir(agent_id, session_id);
        uploads
            .iter()
            .map(|upload| persist_attachment(&assets_dir, session_id.as_str(), upload))
            .collect()
    }

    /// List every session belonging to `agent_id`, most recently updated
    /// first. Sessions whose log fails to parse are silently skipped, same
    /// as a single bad line within [`Self::load`].
    ///
    /// # Errors
    ///
    /// Returns an error only if the agent's `sessions/` directory exists but
    /// cannot be read.
    pub fn list_sessions(&self, agent_id: &AgentId) -> StorageResult<Vec<SessionSummary>> {
        let dir = self.sessions_dir(agent_id);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut summaries = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(std::ffi::OsStr::to_str) != Some("jsonl") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(std::ffi::OsStr::to_str) else {
                continue;
            };
            let Ok(session_id) = SessionId::new(stem) else {
                continue;
            };
            if let Ok((summary, _events)) = self.load(agent_id, &session_id) {
                summaries.push(summary);
            }
        }

        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(summaries)
    }

    /// Delete every session of `agent_id` whose `updatedAt` is older than
    /// `max_age_days`, returning the number removed.
    ///
    /// # Errors
    ///
    /// Propagates any error from listing or deleting a session.
    pub fn cleanup_old(&self, agent_id: &AgentId, max_age_days: i64) -> StorageResult<usize> {
        let cutoff = chrono::Utc::now() - chrono::Duration::days(max_age_days);
        let mut removed = 0;
        for summary in self.list_sessions(agent_id)? {
            if summary.updated_at < cutoff {
                let session_id = SessionId::new(summary.id.as_str())
                    .map_err(|e| StorageError::InvalidPayload(e.to_string()))?;
                self.delete(agent_id, &session_id)?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use hearth_core::EventPayload;
    use tempfile::TempDir;

    fn setup() -> (TempDir, EventLogStore, AgentId, SessionId) {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("a1")).unwrap();
        let store = EventLogStore::new(dir.path());
        (dir, store, AgentId::new("a1").unwrap(), SessionId::new("s1").unwrap())
    }

    fn created_event(agent_id: &AgentId, session_id: &SessionId) -> Event {
        Event::new(
            agent_id.clone(),
            session_id.clone(),
            Utc::now(),
            EventPayload::SessionCreated {
                title: "T".to_string(),
                parent_session_id: None,
            },
        )
    }

    #[test]
    fn create_fails_for_missing_agent() {
        let dir = TempDir::new().unwrap();
        let store = EventLogStore::new(dir.path());
        let agent_id = AgentId::new("missing").unwrap();
        let session_id = SessionId::new("s1").unwrap();
        let event = created_event(&agent_id, &session_id);
        let result = store.create(&agent_id, &session_id, &[event]);
        assert!(matches!(result, Err(StorageError::AgentNotFound(_))));
    }

    #[test]
    fn create_fails_on_empty_batch() {
        let (_dir, store, agent_id, session_id) = setup();
        let result = store.create(&agent_id, &session_id, &[]);
        assert!(matches!(result, Err(StorageError::InvalidPayload(_))));
    }

    #[test]
    fn create_then_load_round_trips() {
        let (_dir, store, agent_id, session_id) = setup();
        let event = created_event(&agent_id, &session_id);
        let summary = store.create(&agent_id, &session_id, &[event]).unwrap();
        assert_eq!(summary.title, "T");
        assert_eq!(summary.message_count, 0);

        let (loaded_summary, events) = store.load(&agent_id, &session_id).unwrap();
        assert_eq!(loaded_summary, summary);
        assert_eq!(events.len(), 1);
        assert!(events[0].is_session_created());
    }

    #[test]
    fn append_fails_when_session_missing() {
        let (_dir, store, agent_id, session_id) = setup();
        let event = created_event(&agent_id, &session_id);
        let result = store.append(&agent_id, &session_id, &[event]);
        assert!(matches!(result, Err(StorageError::SessionNotFound(_))));
    }

    #[test]
    fn append_preserves_prior_lines() {
        let (_dir, store, agent_id, session_id) = setup();
        let created = created_event(&agent_id, &session_id);
        store.create(&agent_id, &session_id, &[created]).unwrap();

        let msg = Event::new(
            agent_id.clone(),
            session_id.clone(),
            Utc::now(),
            EventPayload::Message {
                role: hearth_core::MessageRole::User,
                segments: vec![hearth_core::MessageSegment::Text {
                    text: "hi".to_string(),
                }],
                user_id: "u".to_string(),
            },
        );
        store.append(&agent_id, &session_id, &[msg]).unwrap();

        let (summary, events) = store.load(&agent_id, &session_id).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(summary.message_count, 1);
    }

    #[test]
    fn load_sorts_by_created_at_and_skips_bad_lines() {
        let (_dir, store, agent_id, session_id) = setup();
        let t0 = Utc::now();
        let t1 = t0 + chrono::Duration::seconds(5);

        let created = Event::new(
            agent_id.clone(),
            session_id.clone(),
            t1,
            EventPayload::SessionCreated {
                title: "T".to_string(),
                parent_session_id: None,
            },
        );
        store.create(&agent_id, &session_id, &[created]).unwrap();

        let path = store.session_path(&agent_id, &session_id);
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(b"not json at all\n").unwrap();

        let early_msg = Event::new(
            agent_id.clone(),
            session_id.clone(),
            t0,
            EventPayload::Message {
                role: hearth_core::MessageRole::User,
                segments: vec![],
                user_id: "u".to_string(),
            },
        );
        store.append(&agent_id, &session_id, &[early_msg]).unwrap();

        let (_summary, events) = store.load(&agent_id, &session_id).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].created_at, t0);
        assert_eq!(events[1].created_at, t1);
    }

    #[test]
    fn delete_removes_log_and_assets_and_is_idempotent() {
        let (_dir, store, agent_id, session_id) = setup();
        let created = created_event(&agent_id, &session_id);
        store.create(&agent_id, &session_id, &[created]).unwrap();
        store.delete(&agent_id, &session_id).unwrap();
        assert!(matches!(
            store.load(&agent_id, &session_id),
            Err(StorageError::SessionNotFound(_))
        ));
        // Deleting again is a no-op, not an error.
        store.delete(&agent_id, &session_id).unwrap();
    }

    #[test]
    fn list_sessions_returns_newest_first() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("a1")).unwrap();
        let store = EventLogStore::new(dir.path());
        let agent_id = AgentId::new("a1").unwrap();

        let older = SessionId::new("s-older").unwrap();
        let newer = SessionId::new("s-newer").unwrap();
        let t0 = Utc::now();
        let t1 = t0 + chrono::Duration::seconds(5);

        store
            .create(
                &agent_id,
                &older,
                &[Event::new(
                    agent_id.clone(),
                    older.clone(),
                    t0,
                    EventPayload::SessionCreated {
                        title: "Older".to_string(),
                        parent_session_id: None,
                    },
                )],
            )
            .unwrap();
        store
            .create(
                &agent_id,
                &newer,
                &[Event::new(
                    agent_id.clone(),
                    newer.clone(),
                    t1,
                    EventPayload::SessionCreated {
                        title: "Newer".to_string(),
                        parent_session_id: None,
                    },
                )],
            )
            .unwrap();

        let summaries = store.list_sessions(&agent_id).unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].title, "Newer");
        assert_eq!(summaries[1].title, "Older");
    }

    #[test]
    fn list_sessions_is_empty_when_no_sessions_dir() {
        let dir = TempDir::new().unwrap();
        let store = EventLogStore::new(dir.path());
        let agent_id = AgentId::new("a1").unwrap();
        assert_eq!(store.list_sessions(&agent_id).unwrap(), Vec::new());
    }

    #[test]
    fn cleanup_old_removes_only_stale_sessions() {
        let (_dir, store, agent_id, session_id) = setup();
        let stale = SessionId::new("s-stale").unwrap();
        let old_time = Utc::now() - chrono::Duration::days(30);

        store
            .create(
                &agent_id,
                &stale,
                &[Event::new(
                    agent_id.clone(),
                    stale.clone(),
                    old_time,
                    EventPayload::SessionCreated {
                        title: "Stale".to_string(),
                        parent_session_id: None,
                    },
                )],
            )
            .unwrap();
        store
            .create(&agent_id, &session_id, &[created_event(&agent_id, &session_id)])
            .unwrap();

        let removed = store.cleanup_old(&agent_id, 1).unwrap();
        assert_eq!(removed, 1);
        assert!(matches!(
            store.load(&agent_id, &stale),
            Err(StorageError::SessionNotFound(_))
        ));
        assert!(store.load(&agent_id, &session_id).is_ok());
    }
}

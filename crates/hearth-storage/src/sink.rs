//! Persistence Sink: a best-effort relational mirror of the event log.
//!
//! The sink consumes the same events the orchestrator appends to the Event
//! Log Store and writes them into relational tables (`events`, `artifacts`,
//! `memory_bulletins`, `token_usage`, `dashboard_projects`,
//! `dashboard_project_channels`, `dashboard_project_tasks`) for downstream
//! dashboards and analytics. It is never on the critical path: every write
//! failure is swallowed and the record is retained in an in-memory fallback
//! buffer instead of being lost outright. Bounded growth of that buffer is
//! acceptable for this milestone — nothing currently drains it back out.

use hearth_core::Event;
use std::sync::Mutex;
use tracing::warn;

#[cfg(feature = "sink")]
use crate::db::Database;

/// Name of a relational table the sink writes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkTable {
    /// Mirrors the event log.
    Events,
    /// Generated files or other byte artifacts referenced by a session.
    Artifacts,
    /// Long-lived memory notes surfaced to future turns.
    MemoryBulletins,
    /// Per-turn token accounting.
    TokenUsage,
    /// Dashboard project records.
    DashboardProjects,
    /// Dashboard project channel records.
    DashboardProjectChannels,
    /// Dashboard project task records.
    DashboardProjectTasks,
}

impl SinkTable {
    fn name(self) -> &'static str {
        match self {
            SinkTable::Events => "events",
            SinkTable::Artifacts => "artifacts",
            SinkTable::MemoryBulletins => "memory_bulletins",
            SinkTable::TokenUsage => "token_usage",
            SinkTable::DashboardProjects => "dashboard_projects",
            SinkTable::DashboardProjectChannels => "dashboard_project_channels",
            SinkTable::DashboardProjectTasks => "dashboard_project_tasks",
        }
    }
}

/// A record that failed to write and was retained for later inspection.
#[derive(Debug, Clone)]
pub struct FallbackRecord {
    /// Table the record was destined for.
    pub table: SinkTable,
    /// The record, serialized to JSON.
    pub payload: serde_json::Value,
}

/// Best-effort relational sink. Construct with [`PersistenceSink::disabled`]
/// when no database is configured — every write then lands directly in the
/// fallback buffer, which keeps the orchestrator's hot path identical
/// whether or not a sink is wired up.
pub struct PersistenceSink {
    #[cfg(feature = "sink")]
    db: Option<Database>,
    fallback: Mutex<Vec<FallbackRecord>>,
}

impl PersistenceSink {
    /// A sink with no backing database: every record goes straight to the
    /// fallback buffer.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            #[cfg(feature = "sink")]
            db: None,
            fallback: Mutex::new(Vec::new()),
        }
    }

    /// A sink backed by an already-connected database.
    #[cfg(feature = "sink")]
    #[must_use]
    pub fn connected(db: Database) -> Self {
        Self {
            db: Some(db),
            fallback: Mutex::new(Vec::new()),
        }
    }

    /// Record one orchestrator event into the `events` table.
    pub async fn record_event(&self, event: &Event) {
        let payload = match serde_json::to_value(event) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "failed to serialize event for persistence sink");
                return;
            },
        };
        self.write(SinkTable::Events, payload).await;
    }

    /// Record an arbitrary row into one of the sink's other tables.
    pub async fn record(&self, table: SinkTable, payload: serde_json::Value) {
        self.write(table, payload).await;
    }

    #[cfg(feature = "sink")]
    async fn write(&self, table: SinkTable, payload: serde_json::Value) {
        let Some(db) = &self.db else {
            self.push_fallback(table, payload);
            return;
        };

        let result: Result<Vec<serde_json::Value>, surrealdb::Error> =
            db.client().create(table.name()).content(payload.clone()).await;

        if let Err(e) = result {
            warn!(table = table.name(), error = %e, "persistence sink write failed, buffering");
            self.push_fallback(table, payload);
        }
    }

    #[cfg(not(feature = "sink"))]
    async fn write(&self, table: SinkTable, payload: serde_json::Value) {
        self.push_fallback(table, payload);
    }

    fn push_fallback(&self, table: SinkTable, payload: serde_json::Value) {
        let mut fallback = self.fallback.lock().unwrap_or_else(|e| e.into_inner());
        fallback.push(FallbackRecord { table, payload });
    }

    /// Number of records currently buffered because a write failed (or no
    /// database is configured).
    #[must_use]
    pub fn fallback_len(&self) -> usize {
        self.fallback.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

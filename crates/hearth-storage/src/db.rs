//! `SurrealDB` connection wrapper backing the persistence sink.
//!
//! Embedded mode uses `SurrealKV` for on-disk storage; tests use the
//! in-memory engine.

#![cfg(feature = "sink")]

use crate::error::{StorageError, StorageResult};

/// `SurrealDB` connection, namespaced to this service.
pub struct Database {
    inner: surrealdb::Surreal<surrealdb::engine::any::Any>,
}

impl Database {
    /// Connect to an embedded `SurrealKV`-backed database rooted at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::StorageFailure`] if the connection fails.
    pub async fn connect_embedded(path: &str) -> StorageResult<Self> {
        let endpoint = format!("surrealkv://{path}");
        let db: surrealdb::Surreal<surrealdb::engine::any::Any> = surrealdb::Surreal::init();
        db.connect(&endpoint)
            .await
            .map_err(|e| StorageError::StorageFailure(e.to_string()))?;
        db.use_ns("hearth")
            .use_db("main")
            .await
            .map_err(|e| StorageError::StorageFailure(e.to_string()))?;
        Ok(Self { inner: db })
    }

    /// Connect to an in-memory database, for tests and default startup.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::StorageFailure`] if the connection fails.
    pub async fn connect_memory() -> StorageResult<Self> {
        let db: surrealdb::Surreal<surrealdb::engine::any::Any> = surrealdb::Surreal::init();
        db.connect("mem://")
            .await
            .map_err(|e| StorageError::StorageFailure(e.to_string()))?;
        db.use_ns("hearth")
            .use_db("main")
            .await
            .map_err(|e| StorageError::StorageFailure(e.to_string()))?;
        Ok(Self { inner: db })
    }

    /// The underlying client, for direct `SurrealQL` access.
    #[must_use]
    pub fn client(&self) -> &surrealdb::Surreal<surrealdb::engine::any::Any> {
        &self.inner
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}

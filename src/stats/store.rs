//! Key-value persistence for the stats blob.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::NaiveDateTime;
use derive_getters::Getters;
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument};

use super::{StoreError, schema};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Opaque blob storage keyed by name.
pub trait StatsStore: Send + Sync {
    /// Reads the blob stored under `key`, if any.
    fn load(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `blob` under `key`, replacing any previous value.
    fn save(&self, key: &str, blob: &str) -> Result<(), StoreError>;
}

/// Process-local store; contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStatsStore {
    blobs: Mutex<HashMap<String, String>>,
}

impl MemoryStatsStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with one blob.
    pub fn with_blob(key: impl Into<String>, blob: impl Into<String>) -> Self {
        let store = Self::default();
        store
            .blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), blob.into());
        store
    }
}

impl StatsStore for MemoryStatsStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        let blobs = self.blobs.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(blobs.get(key).cloned())
    }

    fn save(&self, key: &str, blob: &str) -> Result<(), StoreError> {
        let mut blobs = self.blobs.lock().unwrap_or_else(PoisonError::into_inner);
        blobs.insert(key.to_string(), blob.to_string());
        Ok(())
    }
}

/// One stored blob row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, Getters)]
#[diesel(table_name = schema::stats_blobs)]
pub struct StatsBlob {
    key: String,
    blob: String,
    updated_at: NaiveDateTime,
}

/// SQLite-backed store.
#[derive(Debug, Clone)]
pub struct SqliteStatsStore {
    db_path: String,
}

impl SqliteStatsStore {
    /// Opens the database at `db_path`, creating the schema if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the database cannot be opened or migrated.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn open(db_path: String) -> Result<Self, StoreError> {
        info!(path = %db_path, "Opening stats store");
        let store = Self { db_path };
        let mut conn = store.connection()?;
        conn.run_pending_migrations(MIGRATIONS)
            .map_err(|e| StoreError::migrate(&store.db_path, e))?;
        Ok(store)
    }

    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, StoreError> {
        debug!(path = %self.db_path, "Establishing connection");
        SqliteConnection::establish(&self.db_path)
            .map_err(|e| StoreError::connect(&self.db_path, e))
    }

    /// Returns the full row stored under `key`.
    #[instrument(skip(self))]
    pub fn row(&self, key: &str) -> Result<Option<StatsBlob>, StoreError> {
        let mut conn = self.connection()?;
        let row = schema::stats_blobs::table
            .find(key)
            .select(StatsBlob::as_select())
            .first(&mut conn)
            .optional()
            .map_err(|e| StoreError::query(key, e))?;
        Ok(row)
    }
}

impl StatsStore for SqliteStatsStore {
    #[instrument(skip(self))]
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.row(key)?.map(|row| row.blob))
    }

    #[instrument(skip(self, blob), fields(len = blob.len()))]
    fn save(&self, key: &str, blob: &str) -> Result<(), StoreError> {
        let mut conn = self.connection()?;
        let row = StatsBlob {
            key: key.to_string(),
            blob: blob.to_string(),
            updated_at: chrono::Utc::now().naive_utc(),
        };
        diesel::replace_into(schema::stats_blobs::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(|e| StoreError::query(key, e))?;
        debug!("Stats blob saved");
        Ok(())
    }
}

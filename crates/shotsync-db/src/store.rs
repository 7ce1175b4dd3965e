//! [`EntityStore`] implementation backed by the SQLite pool.

use async_trait::async_trait;
use shotsync_common::{EntityStore, Record, ScopeFilter, StoreError};
use tracing::debug;

use crate::pool::{get_conn, init_memory_pool, init_pool, DbPool};
use crate::queries::entities;

/// Local entity store.
///
/// Used for offline work and dry runs, and as the backing store in tests.
/// Queries run synchronously on a pooled connection; no connection is held
/// across an await point.
#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    /// Wrap an existing pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Open (and migrate) the database file at `path`.
    pub fn open(path: &str) -> Result<Self, StoreError> {
        Ok(Self::new(init_pool(path)?))
    }

    /// Fresh in-memory store.
    pub fn in_memory() -> Result<Self, StoreError> {
        Ok(Self::new(init_memory_pool()?))
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Number of stored entities of `entity_type`.
    pub fn count(&self, entity_type: &str) -> Result<i64, StoreError> {
        let conn = get_conn(&self.pool)?;
        entities::count_entities(&conn, entity_type)
    }
}

#[async_trait]
impl EntityStore for SqliteStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn find(
        &self,
        entity_type: &str,
        filters: &[ScopeFilter],
        fields: &[String],
    ) -> Result<Vec<Record>, StoreError> {
        let conn = get_conn(&self.pool)?;
        let records = entities::find_entities(&conn, entity_type, filters, fields)?;
        debug!(entity_type, matches = records.len(), "sqlite find");
        Ok(records)
    }

    async fn create(&self, entity_type: &str, data: &Record) -> Result<Record, StoreError> {
        let conn = get_conn(&self.pool)?;
        entities::insert_entity(&conn, entity_type, data)
    }
}

//! Shared test harness for integration tests.
//!
//! Provides [`CountingStore`], an in-memory SQLite entity store that counts
//! the remote calls made through it, and [`TestHarness`] which wires a
//! [`Session`] over that store with default configuration.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use shotsync::config::Config;
use shotsync::session::Session;
use shotsync_common::{EntityStore, Record, ScopeFilter, StoreError};
use shotsync_db::SqliteStore;

/// SQLite-backed store that records every `find` and `create`.
pub struct CountingStore {
    inner: SqliteStore,
    finds: AtomicUsize,
    creates: AtomicUsize,
    find_filters: std::sync::Mutex<Vec<(String, Vec<ScopeFilter>)>>,
    find_delay: Option<Duration>,
}

impl CountingStore {
    pub fn new() -> Self {
        Self {
            inner: SqliteStore::in_memory().expect("failed to create in-memory store"),
            finds: AtomicUsize::new(0),
            creates: AtomicUsize::new(0),
            find_filters: std::sync::Mutex::new(Vec::new()),
            find_delay: None,
        }
    }

    /// Sleep inside every `find`, widening the window between find and create.
    pub fn with_find_delay(mut self, delay: Duration) -> Self {
        self.find_delay = Some(delay);
        self
    }

    pub fn finds(&self) -> usize {
        self.finds.load(Ordering::SeqCst)
    }

    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    /// Entity types and filters of every `find`, in call order.
    pub fn find_log(&self) -> Vec<(String, Vec<ScopeFilter>)> {
        self.find_filters.lock().unwrap().clone()
    }

    /// Insert a record directly, bypassing the counters.
    pub async fn seed(&self, entity_type: &str, data: Record) -> Record {
        self.inner.create(entity_type, &data).await.unwrap()
    }

    pub fn count(&self, entity_type: &str) -> usize {
        self.inner.count(entity_type).unwrap() as usize
    }
}

#[async_trait]
impl EntityStore for CountingStore {
    fn name(&self) -> &'static str {
        "counting"
    }

    async fn find(
        &self,
        entity_type: &str,
        filters: &[ScopeFilter],
        fields: &[String],
    ) -> Result<Vec<Record>, StoreError> {
        self.finds.fetch_add(1, Ordering::SeqCst);
        self.find_filters
            .lock()
            .unwrap()
            .push((entity_type.to_string(), filters.to_vec()));
        if let Some(delay) = self.find_delay {
            tokio::time::sleep(delay).await;
        }
        self.inner.find(entity_type, filters, fields).await
    }

    async fn create(&self, entity_type: &str, data: &Record) -> Result<Record, StoreError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.inner.create(entity_type, data).await
    }
}

/// A session over a [`CountingStore`] with the given config.
pub struct TestHarness {
    pub store: Arc<CountingStore>,
    pub session: Session,
    pub config: Config,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let store = Arc::new(CountingStore::new());
        let session = Session::new(&config, store.clone(), None);
        Self {
            store,
            session,
            config,
        }
    }
}

//! Session-scoped record cache.
//!
//! A cache lives exactly as long as one processing session: it starts empty,
//! fills lazily as keys are resolved, and is never evicted. Dropping it ends
//! the session.

use std::collections::HashMap;

use shotsync_common::{CacheKey, Record, SessionId};

/// Remote-call counters for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Store `find` calls issued.
    pub finds: usize,
    /// Store `create` calls issued.
    pub creates: usize,
    /// Resolutions answered from the cache.
    pub hits: usize,
}

/// Records resolved during one session, keyed by natural key.
#[derive(Debug, Default)]
pub struct SessionCache {
    id: SessionId,
    entries: HashMap<CacheKey, Record>,
    stats: SessionStats,
}

impl SessionCache {
    /// Start a new, empty session.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Look a key up, counting a hit when present.
    pub fn lookup(&mut self, key: &CacheKey) -> Option<Record> {
        let found = self.entries.get(key).cloned();
        if found.is_some() {
            self.stats.hits += 1;
        }
        found
    }

    /// Look a key up without touching the counters.
    pub fn peek(&self, key: &CacheKey) -> Option<&Record> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: CacheKey, record: Record) {
        self.entries.insert(key, record);
    }

    pub(crate) fn record_find(&mut self) {
        self.stats.finds += 1;
    }

    pub(crate) fn record_create(&mut self) {
        self.stats.creates += 1;
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

//! Find-or-create entity resolution with a session cache.
//!
//! [`EntityResolver::resolve`] turns a natural key into the unique matching
//! record, creating the record when the store has none. Within one session a
//! key costs at most one `find` and one `create`; later requests are served
//! from the [`SessionCache`].
//!
//! The cache sits behind an async mutex that stays locked for the whole
//! find-then-create sequence, so a resolver shared between tasks never
//! creates the same record twice.

mod cache;

pub use cache::{SessionCache, SessionStats};

use std::sync::Arc;

use shotsync_common::{
    EntityStore, NaturalKey, Record, ResolveError, Result, ScopeFilter, SessionId, CODE_FIELD,
};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Where a resolved record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Served from the session cache.
    Cached,
    /// Exactly one existing record matched.
    Found,
    /// No record matched and one was created.
    Created,
}

/// Resolves natural keys against an [`EntityStore`], one session at a time.
pub struct EntityResolver {
    store: Arc<dyn EntityStore>,
    session_id: SessionId,
    session: Mutex<SessionCache>,
    return_fields: Vec<String>,
}

impl EntityResolver {
    /// Create a resolver with a fresh session.
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        let session = SessionCache::new();
        Self {
            store,
            session_id: session.id(),
            session: Mutex::new(session),
            return_fields: Vec::new(),
        }
    }

    /// Fields requested from the store on `find`.
    ///
    /// `code` is always requested alongside a non-empty list. An empty list
    /// asks the store for every field.
    pub fn with_return_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        if !fields.is_empty() {
            fields.insert(0, CODE_FIELD.to_string());
        }
        let mut seen = std::collections::HashSet::new();
        fields.retain(|f| seen.insert(f.clone()));
        self.return_fields = fields;
        self
    }

    pub fn return_fields(&self) -> &[String] {
        &self.return_fields
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn store(&self) -> &Arc<dyn EntityStore> {
        &self.store
    }

    /// Return the unique `entity_type` record with `code` inside `scope_filters`,
    /// creating it when none exists.
    ///
    /// # Errors
    ///
    /// - [`ResolveError::InvalidKey`] when `entity_type` or `code` is empty.
    /// - [`ResolveError::AmbiguousEntity`] when more than one record matches;
    ///   nothing is created.
    /// - [`ResolveError::Store`] with the store's own error, unretried.
    pub async fn resolve(
        &self,
        entity_type: &str,
        scope_filters: &[ScopeFilter],
        code: &str,
    ) -> Result<Record> {
        let key = NaturalKey::new(entity_type, scope_filters.to_vec(), code);
        self.resolve_key(&key).await.map(|(record, _)| record)
    }

    /// Like [`resolve`](Self::resolve), also reporting where the record came from.
    pub async fn resolve_key(&self, key: &NaturalKey) -> Result<(Record, Origin)> {
        if key.entity_type.trim().is_empty() {
            return Err(ResolveError::invalid_key("entity type is empty"));
        }
        if key.code.trim().is_empty() {
            return Err(ResolveError::invalid_key(format!(
                "{} code is empty",
                key.entity_type
            )));
        }

        let cache_key = key.cache_key();
        let mut session = self.session.lock().await;

        if let Some(record) = session.lookup(&cache_key) {
            debug!(session = %self.session_id, key = %cache_key, "cache hit");
            return Ok((record, Origin::Cached));
        }

        session.record_find();
        let mut matches = self
            .store
            .find(&key.entity_type, &key.query_filters(), &self.return_fields)
            .await?;

        let (record, origin) = match matches.len() {
            0 => {
                let data = key.create_fields();
                session.record_create();
                let created = self.store.create(&key.entity_type, &data).await?;
                info!(
                    session = %self.session_id,
                    entity_type = %key.entity_type,
                    code = %key.code,
                    id = ?created.id(),
                    "Created {} in {} store",
                    key.entity_type,
                    self.store.name()
                );
                (created, Origin::Created)
            }
            1 => (matches.remove(0), Origin::Found),
            count => {
                return Err(ResolveError::ambiguous(
                    key.entity_type.as_str(),
                    key.code.as_str(),
                    count,
                ));
            }
        };

        session.insert(cache_key, record.clone());
        Ok((record, origin))
    }

    /// The cached record for `key`, if this session has resolved it.
    pub async fn cached(&self, key: &NaturalKey) -> Option<Record> {
        self.session.lock().await.peek(&key.cache_key()).cloned()
    }

    pub async fn stats(&self) -> SessionStats {
        self.session.lock().await.stats()
    }

    /// Number of keys resolved in this session.
    pub async fn len(&self) -> usize {
        self.session.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.session.lock().await.is_empty()
    }
}

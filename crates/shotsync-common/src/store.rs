//! Contract for the remote entity store.
//!
//! Stores do not enforce uniqueness of natural keys; detecting ambiguity is
//! the resolver's job.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::filter::ScopeFilter;
use crate::record::Record;

/// Async trait implemented by every entity store backend.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Short, lowercase identifier for this backend (e.g. `"rest"`).
    fn name(&self) -> &'static str;

    /// Return every record of `entity_type` matching all `filters`.
    ///
    /// `fields` lists the fields to return besides `type` and `id`; an empty
    /// list lets the backend choose.
    async fn find(
        &self,
        entity_type: &str,
        filters: &[ScopeFilter],
        fields: &[String],
    ) -> Result<Vec<Record>, StoreError>;

    /// Create a record of `entity_type` and return it as stored.
    async fn create(&self, entity_type: &str, data: &Record) -> Result<Record, StoreError>;
}

#[async_trait]
impl<S: EntityStore + ?Sized> EntityStore for Arc<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn find(
        &self,
        entity_type: &str,
        filters: &[ScopeFilter],
        fields: &[String],
    ) -> Result<Vec<Record>, StoreError> {
        (**self).find(entity_type, filters, fields).await
    }

    async fn create(&self, entity_type: &str, data: &Record) -> Result<Record, StoreError> {
        (**self).create(entity_type, data).await
    }
}

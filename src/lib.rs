//! Shotsync - shot tracking lookups for compositing pipeline hooks
//!
//! Resolves Episode, Sequence and Shot entities in a production-tracking
//! store with find-or-create semantics, fills custom `{keyword}` tokens in
//! export naming templates, and carries the naming and frame-range helpers
//! used by the publish hooks.

pub mod config;
pub mod frame_range;
pub mod hierarchy;
pub mod keywords;
pub mod publish;
pub mod resolver;
pub mod session;
pub mod store;

pub use resolver::{EntityResolver, Origin};
pub use shotsync_common::{
    EntityRef, EntityStore, FieldValue, NaturalKey, Record, ResolveError, ScopeFilter, StoreError,
};

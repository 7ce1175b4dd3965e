//! Shotsync-Common: record model, scope filters, errors and the store contract.
//!
//! This crate provides the pieces every other shotsync crate shares:
//!
//! - **Records**: [`Record`] field maps, [`FieldValue`]s and [`EntityRef`] links
//! - **Keys**: [`ScopeFilter`]s, [`NaturalKey`]s and the derived [`CacheKey`]
//! - **Typed IDs**: store-assigned [`EntityId`]s and per-run [`SessionId`]s
//! - **Error Handling**: [`ResolveError`] and [`StoreError`]
//! - **Store Contract**: the async [`EntityStore`] trait
//!
//! # Examples
//!
//! ```
//! use shotsync_common::{EntityRef, NaturalKey, Record, ScopeFilter};
//!
//! let key = NaturalKey::new(
//!     "Shot",
//!     vec![ScopeFilter::is("project", EntityRef::new("Project", 65))],
//!     "SH010",
//! );
//! assert_eq!(key.query_filters().len(), 2);
//!
//! let shot = Record::new().with("type", "Shot").with("id", 1).with("code", "SH010");
//! assert_eq!(shot.get_string("code"), "SH010");
//! assert_eq!(shot.get_string("sg_cut_in"), "");
//! ```

pub mod error;
pub mod filter;
pub mod ids;
pub mod record;
pub mod store;

pub use error::{ResolveError, Result, StoreError};
pub use filter::{CacheKey, NaturalKey, Relation, ScopeFilter};
pub use ids::{EntityId, SessionId};
pub use record::{EntityRef, FieldValue, Record, CODE_FIELD, ID_FIELD, TYPE_FIELD};
pub use store::EntityStore;

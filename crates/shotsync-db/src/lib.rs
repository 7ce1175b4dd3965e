//! Shotsync-DB: SQLite entity store
//!
//! This crate provides a local [`EntityStore`](shotsync_common::EntityStore)
//! using SQLite with rusqlite and r2d2 connection pooling.
//!
//! # Modules
//!
//! - `migrations` - Database schema migrations
//! - `pool` - Connection pool management
//! - `queries` - Database query operations
//! - `store` - The [`SqliteStore`] backend
//!
//! # Example
//!
//! ```no_run
//! use shotsync_db::SqliteStore;
//!
//! let store = SqliteStore::open("/var/lib/shotsync/entities.sqlite").unwrap();
//! println!("{} shots", store.count("Shot").unwrap());
//! ```

pub mod migrations;
pub mod pool;
pub mod queries;
pub mod store;

pub use store::SqliteStore;

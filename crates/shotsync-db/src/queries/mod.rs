//! Database query modules.
//!
//! - entities: entity insert, lookup and filtered search

pub mod entities;

//! Error types used throughout shotsync.
//!
//! Resolution failures form a small closed set so callers can branch on the
//! kind of failure instead of parsing messages. Errors raised by an entity
//! store are carried through [`ResolveError::Store`] unchanged.

/// Failure reported by an [`EntityStore`](crate::store::EntityStore) backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The request never produced a response (connection, timeout, TLS).
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The store answered with a non-success status.
    #[error("{operation} returned {status}: {body}")]
    Status {
        operation: String,
        status: u16,
        body: String,
    },

    /// A local database operation failed.
    #[error("Database error: {0}")]
    Database(String),

    /// The store answered with a payload that could not be decoded.
    #[error("Invalid store response: {0}")]
    Decode(String),
}

impl StoreError {
    /// Create a new Http error.
    pub fn http<S: Into<String>>(msg: S) -> Self {
        Self::Http(msg.into())
    }

    /// Create a new Database error.
    pub fn database<S: Into<String>>(msg: S) -> Self {
        Self::Database(msg.into())
    }

    /// Create a new Decode error.
    pub fn decode<S: Into<String>>(msg: S) -> Self {
        Self::Decode(msg.into())
    }
}

/// Error returned by entity, keyword and hierarchy resolution.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// More than one record matched a natural key.
    #[error("Multiple {entity_type} entities named '{code}' found ({count} matches)")]
    AmbiguousEntity {
        entity_type: String,
        code: String,
        count: usize,
    },

    /// An owning entity has no resolvable identity.
    #[error("Could not resolve {entity_type} for '{key}'")]
    EntityNotFound { entity_type: String, key: String },

    /// A resolution was requested with an unusable key.
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// The entity store failed; the store's error is surfaced as-is.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ResolveError {
    /// Create a new AmbiguousEntity error.
    pub fn ambiguous<T: Into<String>, C: Into<String>>(
        entity_type: T,
        code: C,
        count: usize,
    ) -> Self {
        Self::AmbiguousEntity {
            entity_type: entity_type.into(),
            code: code.into(),
            count,
        }
    }

    /// Create a new EntityNotFound error.
    pub fn not_found<T: Into<String>, K: Into<String>>(entity_type: T, key: K) -> Self {
        Self::EntityNotFound {
            entity_type: entity_type.into(),
            key: key.into(),
        }
    }

    /// Create a new InvalidKey error.
    pub fn invalid_key<S: Into<String>>(msg: S) -> Self {
        Self::InvalidKey(msg.into())
    }
}

/// Result type alias using [`ResolveError`].
pub type Result<T> = std::result::Result<T, ResolveError>;

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_error_display() {
        let err = ResolveError::ambiguous("Shot", "SH010", 2);
        assert_eq!(
            err.to_string(),
            "Multiple Shot entities named 'SH010' found (2 matches)"
        );

        let err = ResolveError::not_found("Episode", "SEQ01");
        assert_eq!(err.to_string(), "Could not resolve Episode for 'SEQ01'");

        let err = ResolveError::invalid_key("entity type is empty");
        assert_eq!(err.to_string(), "Invalid key: entity type is empty");
    }

    #[test]
    fn test_store_error_is_transparent() {
        let store_err = StoreError::Status {
            operation: "find Shot".to_string(),
            status: 503,
            body: "maintenance".to_string(),
        };
        let expected = store_err.to_string();

        let err = ResolveError::from(store_err);
        assert_eq!(err.to_string(), expected);
        assert_matches!(err, ResolveError::Store(StoreError::Status { status: 503, .. }));
    }

    #[test]
    fn test_ambiguous_carries_fields() {
        let err = ResolveError::ambiguous("Sequence", "SEQ01", 3);
        assert_matches!(
            err,
            ResolveError::AmbiguousEntity { ref entity_type, ref code, count: 3 }
                if entity_type == "Sequence" && code == "SEQ01"
        );
    }

    #[test]
    fn test_store_error_constructors() {
        assert_matches!(StoreError::http("refused"), StoreError::Http(_));
        assert_matches!(StoreError::database("locked"), StoreError::Database(_));
        assert_matches!(StoreError::decode("not json"), StoreError::Decode(_));
        assert_eq!(
            StoreError::database("locked").to_string(),
            "Database error: locked"
        );
    }
}

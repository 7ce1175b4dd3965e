//! Entity store backends selected by configuration.

pub mod rest;

pub use rest::RestStore;
pub use shotsync_db::SqliteStore;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use shotsync_common::EntityStore;

use crate::config::{StoreConfig, StoreKind};
use crate::hierarchy::ThumbnailUploader;

/// A configured store and, when the backend supports it, its thumbnail uploader.
pub struct StoreHandle {
    pub store: Arc<dyn EntityStore>,
    pub thumbnails: Option<Arc<dyn ThumbnailUploader>>,
}

/// Open the backend named by `config.kind`.
pub fn create_store(config: &StoreConfig) -> Result<StoreHandle> {
    match config.kind {
        StoreKind::Rest => {
            let store = Arc::new(
                RestStore::from_config(config)
                    .with_context(|| format!("Failed to create REST client for {}", config.url))?,
            );
            tracing::info!("Using REST entity store at {}", store.base_url());
            Ok(StoreHandle {
                store: store.clone(),
                thumbnails: Some(store),
            })
        }
        StoreKind::Sqlite => {
            let path = expand_path(&config.database);
            tracing::info!("Using SQLite entity store at {}", path.display());
            let store = SqliteStore::open(&path.to_string_lossy())
                .with_context(|| format!("Failed to open database {}", path.display()))?;
            Ok(StoreHandle {
                store: Arc::new(store),
                thumbnails: None,
            })
        }
    }
}

/// Expand a leading `~` and environment variables in a configured path.
fn expand_path(path: &std::path::Path) -> PathBuf {
    let raw = path.to_string_lossy();
    match shellexpand::full(&raw) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_store_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig {
            kind: StoreKind::Sqlite,
            database: dir.path().join("entities.db"),
            ..StoreConfig::default()
        };
        let handle = create_store(&config).unwrap();
        assert_eq!(handle.store.name(), "sqlite");
        assert!(handle.thumbnails.is_none());
    }

    #[test]
    fn test_rest_store_from_config() {
        let config = StoreConfig {
            kind: StoreKind::Rest,
            url: "http://localhost:9".to_string(),
            ..StoreConfig::default()
        };
        let handle = create_store(&config).unwrap();
        assert_eq!(handle.store.name(), "rest");
        assert!(handle.thumbnails.is_some());
    }

    #[test]
    fn test_expand_path_passthrough() {
        let path = std::path::Path::new("/tmp/shotsync.db");
        assert_eq!(expand_path(path), PathBuf::from("/tmp/shotsync.db"));
    }
}

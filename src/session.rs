//! Wiring of resolver, hierarchy and keyword resolver from configuration.

use std::sync::Arc;

use anyhow::Result;
use shotsync_common::{EntityRef, EntityStore};

use crate::config::Config;
use crate::hierarchy::{ShotHierarchy, ThumbnailUploader};
use crate::keywords::KeywordResolver;
use crate::resolver::EntityResolver;
use crate::store::{create_store, StoreHandle};

/// One processing session: a fresh cache over a configured store.
pub struct Session {
    pub resolver: Arc<EntityResolver>,
    pub hierarchy: Arc<ShotHierarchy>,
    pub keywords: KeywordResolver,
}

impl Session {
    /// Open the configured store and start a session on it.
    pub fn from_config(config: &Config) -> Result<Self> {
        let StoreHandle { store, thumbnails } = create_store(&config.store)?;
        Ok(Self::new(config, store, thumbnails))
    }

    pub fn new(
        config: &Config,
        store: Arc<dyn EntityStore>,
        thumbnails: Option<Arc<dyn ThumbnailUploader>>,
    ) -> Self {
        let resolver =
            Arc::new(EntityResolver::new(store).with_return_fields(return_fields(config)));

        let mut hierarchy =
            ShotHierarchy::new(resolver.clone(), project_ref(config), config.hierarchy.clone());
        if let Some(uploader) = thumbnails {
            hierarchy = hierarchy.with_thumbnails(uploader);
        }
        let hierarchy = Arc::new(hierarchy);

        let keywords =
            KeywordResolver::new(hierarchy.clone(), config.keywords.episode_keyword.clone());

        Self {
            resolver,
            hierarchy,
            keywords,
        }
    }
}

/// Fields fetched for every resolved entity: the keyword fields plus the cut
/// range read by frame-range sync. Empty keyword fields mean "all fields".
pub fn return_fields(config: &Config) -> Vec<String> {
    let keywords = &config.keywords.return_fields;
    if keywords.is_empty() {
        return Vec::new();
    }
    let cut = [
        &config.frame_range.cut_in_field,
        &config.frame_range.cut_out_field,
    ];
    keywords.iter().chain(cut).cloned().collect()
}

/// Link to the configured project.
pub fn project_ref(config: &Config) -> EntityRef {
    let project = EntityRef::new("Project", config.project.id);
    match &config.project.name {
        Some(name) => project.with_name(name.as_str()),
        None => project,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shotsync_db::SqliteStore;

    #[test]
    fn test_project_ref() {
        let mut config = Config::default();
        config.project.id = 65;
        assert_eq!(project_ref(&config), EntityRef::new("Project", 65));

        config.project.name = Some("Demo".to_string());
        assert_eq!(project_ref(&config).name.as_deref(), Some("Demo"));
    }

    #[test]
    fn test_return_fields_cover_cut_range() {
        let mut config = Config::default();
        config.keywords.return_fields = vec!["sg_head_in".to_string()];
        config.frame_range.cut_in_field = "cut_in".to_string();
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let session = Session::new(&config, store, None);

        assert_eq!(
            session.resolver.return_fields(),
            ["code", "sg_head_in", "cut_in", "sg_cut_out"]
        );
    }

    #[tokio::test]
    async fn test_session_shares_resolver() {
        let config = Config::default();
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let session = Session::new(&config, store, None);

        session
            .resolver
            .resolve("Episode", &[], "FER_101")
            .await
            .unwrap();
        assert_eq!(session.hierarchy.resolver().len().await, 1);
    }
}

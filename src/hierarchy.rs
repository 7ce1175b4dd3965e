//! Episode → Sequence → Shot resolution.
//!
//! A shot is scoped by its sequence, and a sequence by its episode. The
//! episode is not named by the editorial sequence itself but by a tag on it
//! (the first tag whose name starts with the configured prefix). Each level is
//! an independent find-or-create through the shared [`EntityResolver`], so
//! each level gets its own cache entry, and levels resolve parent-first.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shotsync_common::{
    EntityRef, NaturalKey, Record, ResolveError, Result, ScopeFilter, StoreError,
};
use tracing::debug;

use crate::config::HierarchyConfig;
use crate::resolver::{EntityResolver, Origin};

/// An annotation attached to an editorial sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
}

impl Tag {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self { name: name.into() }
    }
}

/// An editorial sequence as exposed by the compositing host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceItem {
    pub name: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl SequenceItem {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            tags: Vec::new(),
        }
    }

    pub fn with_tag<S: Into<String>>(mut self, name: S) -> Self {
        self.tags.push(Tag::new(name));
        self
    }
}

/// A track item (one shot in the cut) and its parent sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackItem {
    pub name: String,
    pub sequence: SequenceItem,
    /// Media the item was cut from, handed to the thumbnail uploader
    #[serde(default)]
    pub source: Option<String>,
}

impl TrackItem {
    pub fn new<S: Into<String>>(name: S, sequence: SequenceItem) -> Self {
        Self {
            name: name.into(),
            sequence,
            source: None,
        }
    }
}

/// Receives newly resolved shots and sequences for thumbnail upload.
#[async_trait]
pub trait ThumbnailUploader: Send + Sync {
    async fn upload(&self, entity: &Record, source: &str) -> std::result::Result<(), StoreError>;
}

/// Per-call switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    pub upload_thumbnail: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            upload_thumbnail: true,
        }
    }
}

impl ResolveOptions {
    /// Options that never upload thumbnails.
    pub fn without_thumbnails() -> Self {
        Self {
            upload_thumbnail: false,
        }
    }
}

/// Resolves shots together with their sequence and episode.
pub struct ShotHierarchy {
    resolver: Arc<EntityResolver>,
    project: EntityRef,
    config: HierarchyConfig,
    thumbnails: Option<Arc<dyn ThumbnailUploader>>,
}

impl ShotHierarchy {
    pub fn new(resolver: Arc<EntityResolver>, project: EntityRef, config: HierarchyConfig) -> Self {
        Self {
            resolver,
            project,
            config,
            thumbnails: None,
        }
    }

    pub fn with_thumbnails(mut self, uploader: Arc<dyn ThumbnailUploader>) -> Self {
        self.thumbnails = Some(uploader);
        self
    }

    pub fn resolver(&self) -> &Arc<EntityResolver> {
        &self.resolver
    }

    pub fn config(&self) -> &HierarchyConfig {
        &self.config
    }

    /// The first tag on `sequence` naming its episode.
    pub fn episode_tag<'a>(&self, sequence: &'a SequenceItem) -> Option<&'a Tag> {
        sequence
            .tags
            .iter()
            .find(|t| t.name.starts_with(&self.config.episode_tag_prefix))
    }

    /// Resolve the episode named by the sequence's episode tag.
    ///
    /// Fails with [`ResolveError::EntityNotFound`] when the sequence carries no
    /// such tag.
    pub async fn resolve_episode(&self, sequence: &SequenceItem) -> Result<Record> {
        let tag = self.episode_tag(sequence).ok_or_else(|| {
            ResolveError::not_found(self.config.episode_entity.as_str(), sequence.name.as_str())
        })?;

        let key = NaturalKey::new(
            self.config.episode_entity.as_str(),
            vec![self.project_filter()],
            tag.name.as_str(),
        );
        let (episode, _) = self.resolver.resolve_key(&key).await?;
        Ok(episode)
    }

    /// Resolve the sequence, resolving its episode first.
    pub async fn resolve_sequence(
        &self,
        sequence: &SequenceItem,
        options: ResolveOptions,
    ) -> Result<Record> {
        let episode = self.resolve_episode(sequence).await?;
        let episode_ref = link_to(&episode, &self.config.episode_entity)?;

        let key = NaturalKey::new(
            self.config.sequence_entity.as_str(),
            vec![
                self.project_filter(),
                ScopeFilter::is(self.config.sequence_episode_field.as_str(), episode_ref),
            ],
            sequence.name.as_str(),
        );
        let (record, origin) = self.resolver.resolve_key(&key).await?;

        // Sequences have no source clip; the sequence name stands in.
        self.maybe_upload(&record, origin, &sequence.name, options)
            .await?;
        Ok(record)
    }

    /// Resolve the shot for `item`, resolving sequence and episode first.
    pub async fn resolve_shot(&self, item: &TrackItem, options: ResolveOptions) -> Result<Record> {
        let sequence = self.resolve_sequence(&item.sequence, options).await?;
        let sequence_ref = link_to(&sequence, &self.config.sequence_entity)?;

        let key = NaturalKey::new(
            self.config.shot_entity.as_str(),
            vec![
                self.project_filter(),
                ScopeFilter::is(self.config.shot_sequence_field.as_str(), sequence_ref),
            ],
            item.name.as_str(),
        );
        let (record, origin) = self.resolver.resolve_key(&key).await?;

        let source = item.source.as_deref().unwrap_or(&item.name);
        self.maybe_upload(&record, origin, source, options).await?;
        Ok(record)
    }

    fn project_filter(&self) -> ScopeFilter {
        ScopeFilter::is(self.config.project_field.as_str(), self.project.clone())
    }

    async fn maybe_upload(
        &self,
        record: &Record,
        origin: Origin,
        source: &str,
        options: ResolveOptions,
    ) -> Result<()> {
        if origin == Origin::Cached || !options.upload_thumbnail || !self.config.upload_thumbnails
        {
            return Ok(());
        }
        if let Some(uploader) = &self.thumbnails {
            debug!(entity = ?record.id(), source, "uploading thumbnail");
            uploader.upload(record, source).await?;
        }
        Ok(())
    }
}

/// Link to a resolved parent, usable as a child's scope filter value.
fn link_to(record: &Record, entity_type: &str) -> Result<EntityRef> {
    record.to_entity_ref().ok_or_else(|| {
        StoreError::decode(format!("{entity_type} record has no type or id")).into()
    })
}

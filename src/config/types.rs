use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub project: ProjectConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub hierarchy: HierarchyConfig,

    #[serde(default)]
    pub keywords: KeywordsConfig,

    #[serde(default)]
    pub frame_range: FrameRangeConfig,
}

/// The tracking-service project every lookup is scoped to.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProjectConfig {
    #[serde(default = "default_project_id")]
    pub id: i64,

    #[serde(default)]
    pub name: Option<String>,
}

fn default_project_id() -> i64 {
    1
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            id: default_project_id(),
            name: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// Production-tracking REST API.
    Rest,
    /// Local SQLite database.
    #[default]
    Sqlite,
}

impl std::fmt::Display for StoreKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rest => write!(f, "rest"),
            Self::Sqlite => write!(f, "sqlite"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub kind: StoreKind,

    /// Base URL of the REST API (rest only)
    #[serde(default)]
    pub url: String,

    /// Bearer token for the REST API (rest only)
    #[serde(default)]
    pub token: Option<String>,

    /// SQLite database path; `~` is expanded (sqlite only)
    #[serde(default = "default_database")]
    pub database: PathBuf,

    /// Request timeout in seconds (rest only)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Client-side request rate limit (rest only)
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
}

fn default_database() -> PathBuf {
    PathBuf::from("shotsync.db")
}

fn default_timeout() -> u64 {
    30
}

fn default_requests_per_second() -> u32 {
    4
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kind: StoreKind::default(),
            url: String::new(),
            token: None,
            database: default_database(),
            timeout_secs: default_timeout(),
            requests_per_second: default_requests_per_second(),
        }
    }
}

/// Entity and field names used by the Episode → Sequence → Shot chain.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HierarchyConfig {
    /// Sequence tags starting with this prefix name the episode
    #[serde(default = "default_episode_tag_prefix")]
    pub episode_tag_prefix: String,

    #[serde(default = "default_project_field")]
    pub project_field: String,

    #[serde(default = "default_episode_entity")]
    pub episode_entity: String,

    #[serde(default = "default_sequence_entity")]
    pub sequence_entity: String,

    #[serde(default = "default_shot_entity")]
    pub shot_entity: String,

    /// Sequence field linking to its episode
    #[serde(default = "default_sequence_episode_field")]
    pub sequence_episode_field: String,

    /// Shot field linking to its sequence
    #[serde(default = "default_shot_sequence_field")]
    pub shot_sequence_field: String,

    /// Upload thumbnails for newly resolved shots and sequences
    #[serde(default = "default_upload_thumbnails")]
    pub upload_thumbnails: bool,
}

fn default_episode_tag_prefix() -> String {
    "FER_".to_string()
}
fn default_project_field() -> String {
    "project".to_string()
}
fn default_episode_entity() -> String {
    "Episode".to_string()
}
fn default_sequence_entity() -> String {
    "Sequence".to_string()
}
fn default_shot_entity() -> String {
    "Shot".to_string()
}
fn default_sequence_episode_field() -> String {
    "episode".to_string()
}
fn default_shot_sequence_field() -> String {
    "sg_sequence".to_string()
}
fn default_upload_thumbnails() -> bool {
    true
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            episode_tag_prefix: default_episode_tag_prefix(),
            project_field: default_project_field(),
            episode_entity: default_episode_entity(),
            sequence_entity: default_sequence_entity(),
            shot_entity: default_shot_entity(),
            sequence_episode_field: default_sequence_episode_field(),
            shot_sequence_field: default_shot_sequence_field(),
            upload_thumbnails: default_upload_thumbnails(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KeywordsConfig {
    /// Fields requested when a shot is looked up for keyword resolution
    #[serde(default = "default_return_fields")]
    pub return_fields: Vec<String>,

    /// Keyword (without braces) that resolves to the episode code
    #[serde(default = "default_episode_keyword")]
    pub episode_keyword: String,
}

fn default_return_fields() -> Vec<String> {
    ["code", "sg_cut_in", "sg_cut_out", "sg_sequence", "description"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_episode_keyword() -> String {
    "Episode".to_string()
}

impl Default for KeywordsConfig {
    fn default() -> Self {
        Self {
            return_fields: default_return_fields(),
            episode_keyword: default_episode_keyword(),
        }
    }
}

/// Shot cut fields and the script settings applied with a new frame range.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FrameRangeConfig {
    #[serde(default = "default_cut_in_field")]
    pub cut_in_field: String,

    #[serde(default = "default_cut_out_field")]
    pub cut_out_field: String,

    #[serde(default = "default_color_management")]
    pub color_management: String,

    #[serde(default = "default_ocio_config")]
    pub ocio_config: String,

    #[serde(default = "default_fps")]
    pub fps: f64,

    #[serde(default)]
    pub format: FormatConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FormatConfig {
    #[serde(default = "default_format_name")]
    pub name: String,

    #[serde(default = "default_format_width")]
    pub width: u32,

    #[serde(default = "default_format_height")]
    pub height: u32,

    #[serde(default = "default_pixel_aspect")]
    pub pixel_aspect: f64,
}

fn default_cut_in_field() -> String {
    "sg_cut_in".to_string()
}
fn default_cut_out_field() -> String {
    "sg_cut_out".to_string()
}
fn default_color_management() -> String {
    "OCIO".to_string()
}
fn default_ocio_config() -> String {
    "aces_1.0.3".to_string()
}
fn default_fps() -> f64 {
    25.0
}
fn default_format_name() -> String {
    "DEMO".to_string()
}
fn default_format_width() -> u32 {
    1920
}
fn default_format_height() -> u32 {
    1080
}
fn default_pixel_aspect() -> f64 {
    1.0
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            name: default_format_name(),
            width: default_format_width(),
            height: default_format_height(),
            pixel_aspect: default_pixel_aspect(),
        }
    }
}

impl Default for FrameRangeConfig {
    fn default() -> Self {
        Self {
            cut_in_field: default_cut_in_field(),
            cut_out_field: default_cut_out_field(),
            color_management: default_color_management(),
            ocio_config: default_ocio_config(),
            fps: default_fps(),
            format: FormatConfig::default(),
        }
    }
}

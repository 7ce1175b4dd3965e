//! Publish naming for rendered outputs.
//!
//! The collector turns each selected Write/Read node into a publish item.
//! Names are derived from the fields the render publish template extracts
//! from the output path.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::frame_range::FrameRange;

/// Colour space assumed for collected renders.
pub const DEFAULT_COLOR_SPACE: &str = "Output - Rec709";

/// Display name built from the template's `name` and `channel` fields.
pub fn publish_display_name(name: Option<&str>, channel: Option<&str>) -> String {
    let name = name.filter(|s| !s.is_empty());
    let channel = channel.filter(|s| !s.is_empty());
    match (name, channel) {
        (None, None) => "Publish".to_string(),
        (None, Some(channel)) => format!("Channel {channel}"),
        (Some(name), None) => name.to_string(),
        (Some(name), Some(channel)) => format!("{name}, Channel {channel}"),
    }
}

/// Publish name: `<shot>_<task>`.
pub fn publish_name(shot: &str, task: &str) -> String {
    format!("{shot}_{task}")
}

/// Review movie file name: `<shot>_<task>_<version>.mov`.
pub fn review_movie_name(shot: &str, task: &str, version: &str) -> String {
    format!("{shot}_{task}_{version}.mov")
}

/// Output node types the collector considers, with the knob holding the path.
pub const OUTPUT_NODE_KNOBS: &[(&str, &str)] =
    &[("Read", "file"), ("Write", "file"), ("WriteGeo", "file")];

/// Knob holding the output path for `node_class`, if the collector handles it.
pub fn output_knob(node_class: &str) -> Option<&'static str> {
    OUTPUT_NODE_KNOBS
        .iter()
        .find(|(class, _)| *class == node_class)
        .map(|(_, knob)| *knob)
}

/// A collected render, ready to hand to the publisher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishItem {
    /// Item label, including the node it was collected from
    pub display_name: String,
    pub publish_name: String,
    pub review_movie: String,
    pub path: PathBuf,
    pub version: String,
    pub frame_range: FrameRange,
    pub color_space: String,
}

impl PublishItem {
    /// Build an item from render-template fields.
    ///
    /// Recognized fields: `Shot`, `nuke.output` (the task), `version`, `name`,
    /// `channel`. Missing fields render as empty strings.
    pub fn from_template_fields(
        node_name: &str,
        path: impl Into<PathBuf>,
        fields: &HashMap<String, String>,
        frame_range: FrameRange,
    ) -> Self {
        let field = |key: &str| fields.get(key).map(String::as_str).unwrap_or("");
        let shot = field("Shot");
        let task = field("nuke.output");
        let version = field("version");

        let display = publish_display_name(
            fields.get("name").map(String::as_str),
            fields.get("channel").map(String::as_str),
        );

        Self {
            display_name: format!("{display} ({node_name})"),
            publish_name: publish_name(shot, task),
            review_movie: review_movie_name(shot, task, version),
            path: path.into(),
            version: version.to_string(),
            frame_range,
            color_space: DEFAULT_COLOR_SPACE.to_string(),
        }
    }

    pub fn with_color_space(mut self, color_space: impl Into<String>) -> Self {
        self.color_space = color_space.into();
        self
    }
}

/// Strip the `default (...)` wrapper hosts put around an inherited colour space.
pub fn normalize_color_space(value: &str) -> &str {
    value
        .strip_prefix("default (")
        .and_then(|rest| rest.strip_suffix(')'))
        .unwrap_or(value)
}

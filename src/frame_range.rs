//! Frame-range read/write against a compositing script root.
//!
//! Writing a range applies the project's script settings, locks the range and
//! then writes first/last frame. The root is always left locked.

use std::fmt;

use serde::{Deserialize, Serialize};
use shotsync_common::{Record, ResolveError, Result};
use tracing::debug;

use crate::config::{FormatConfig, FrameRangeConfig};

/// An inclusive frame range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameRange {
    pub first: i64,
    pub last: i64,
}

impl FrameRange {
    /// Fails with [`ResolveError::InvalidKey`] when `first > last`.
    pub fn new(first: i64, last: i64) -> Result<Self> {
        if first > last {
            return Err(ResolveError::invalid_key(format!(
                "frame range {first}-{last} ends before it starts"
            )));
        }
        Ok(Self { first, last })
    }

    /// Read a shot's cut range from `in_field` and `out_field`.
    pub fn from_record(record: &Record, in_field: &str, out_field: &str) -> Result<Self> {
        let frame = |field: &str| {
            record.get(field).and_then(|v| v.as_i64()).ok_or_else(|| {
                ResolveError::invalid_key(format!("record has no integer '{field}'"))
            })
        };
        Self::new(frame(in_field)?, frame(out_field)?)
    }

    /// Number of frames, both ends included.
    pub fn len(&self) -> u64 {
        self.last.abs_diff(self.first) + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, frame: i64) -> bool {
        (self.first..=self.last).contains(&frame)
    }
}

impl fmt::Display for FrameRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.first, self.last)
    }
}

/// Script settings applied whenever the range is written.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectSettings {
    pub color_management: String,
    pub ocio_config: String,
    pub fps: f64,
    pub format: FormatConfig,
}

impl From<&FrameRangeConfig> for ProjectSettings {
    fn from(config: &FrameRangeConfig) -> Self {
        Self {
            color_management: config.color_management.clone(),
            ocio_config: config.ocio_config.clone(),
            fps: config.fps,
            format: config.format.clone(),
        }
    }
}

/// The host's script root: frame knobs, range lock and script settings.
pub trait FrameRangeHost {
    fn first_frame(&self) -> i64;
    fn last_frame(&self) -> i64;
    fn set_frames(&mut self, first: i64, last: i64);
    fn range_locked(&self) -> bool;
    fn set_range_locked(&mut self, locked: bool);
    fn apply_settings(&mut self, settings: &ProjectSettings);
}

pub fn get_frame_range<H: FrameRangeHost + ?Sized>(host: &H) -> FrameRange {
    FrameRange {
        first: host.first_frame(),
        last: host.last_frame(),
    }
}

/// Write `range` to `host`, applying `settings` first. The root ends locked
/// whatever its lock state was before.
pub fn set_frame_range<H: FrameRangeHost + ?Sized>(
    host: &mut H,
    range: FrameRange,
    settings: &ProjectSettings,
) -> Result<()> {
    let range = FrameRange::new(range.first, range.last)?;
    let was_locked = host.range_locked();

    host.apply_settings(settings);
    host.set_range_locked(true);
    host.set_frames(range.first, range.last);

    debug!(range = %range, was_locked, "frame range set");
    Ok(())
}

/// An in-process script root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptRoot {
    pub first_frame: i64,
    pub last_frame: i64,
    pub lock_range: bool,
    pub color_management: String,
    pub ocio_config: String,
    pub fps: f64,
    pub format: String,
}

impl Default for ScriptRoot {
    fn default() -> Self {
        Self {
            first_frame: 1,
            last_frame: 100,
            lock_range: false,
            color_management: "Nuke".to_string(),
            ocio_config: "nuke-default".to_string(),
            fps: 24.0,
            format: "HD_1080".to_string(),
        }
    }
}

impl FrameRangeHost for ScriptRoot {
    fn first_frame(&self) -> i64 {
        self.first_frame
    }

    fn last_frame(&self) -> i64 {
        self.last_frame
    }

    fn set_frames(&mut self, first: i64, last: i64) {
        self.first_frame = first;
        self.last_frame = last;
    }

    fn range_locked(&self) -> bool {
        self.lock_range
    }

    fn set_range_locked(&mut self, locked: bool) {
        self.lock_range = locked;
    }

    fn apply_settings(&mut self, settings: &ProjectSettings) {
        self.color_management = settings.color_management.clone();
        self.ocio_config = settings.ocio_config.clone();
        self.fps = settings.fps;
        let f = &settings.format;
        self.format = format!("{} {} {} {}", f.width, f.height, f.pixel_aspect, f.name);
    }
}

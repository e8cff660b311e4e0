//! Processing configuration.
//!
//! Handles loading and validating `config.toml`. All options have defaults
//! matching a 1280×800 photo frame with a 3 MiB per-image transfer limit, so
//! a config file is only needed to override specific values.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! target_width = 1280       # Output bounding box, pixels
//! target_height = 800
//! max_file_size_mb = 3      # Hard per-image byte budget (MiB)
//! max_photos = 500          # Cap on photos per run (random subset above this)
//! log_level = "info"        # error | warn | info | debug | trace
//!
//! [caption]
//! enabled = true
//! position = "bottom"       # "top" or "bottom"
//! date_format = "%Y-%m-%d %H:%M"
//! font_size = 50
//! # font_path = "/path/to/font.ttf"   # optional; see font fallback chain
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Where the caption block is anchored on the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CaptionPosition {
    Top,
    #[default]
    Bottom,
}

/// Caption overlay settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CaptionConfig {
    /// Draw the date/place overlay at all.
    pub enabled: bool,
    pub position: CaptionPosition,
    /// strftime-style pattern for the timestamp line.
    pub date_format: String,
    /// Point size for TrueType fonts. The builtin fallback font ignores it.
    pub font_size: u32,
    /// Explicit font file. When unset (or missing on disk) the platform
    /// default fonts are tried, then the builtin bitmap font.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_path: Option<PathBuf>,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            position: CaptionPosition::Bottom,
            date_format: "%Y-%m-%d %H:%M".to_string(),
            font_size: 50,
            font_path: None,
        }
    }
}

/// Options for one pipeline run. Immutable once the run starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingOptions {
    /// Output bounding box width, pixels.
    pub target_width: u32,
    /// Output bounding box height, pixels.
    pub target_height: u32,
    /// Per-image encoded size budget, MiB. Images over this after encoding
    /// are rejected (no quality-reduction retry).
    pub max_file_size_mb: u32,
    /// Maximum number of photos per run; above this a uniform random subset
    /// is selected.
    pub max_photos: usize,
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,
    pub caption: CaptionConfig,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            target_width: 1280,
            target_height: 800,
            max_file_size_mb: 3,
            max_photos: 500,
            log_level: "info".to_string(),
            caption: CaptionConfig::default(),
        }
    }
}

impl ProcessingOptions {
    /// Load options from a TOML file and validate them.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let options: ProcessingOptions = toml::from_str(&content)?;
        options.validate()?;
        Ok(options)
    }

    /// Load from `path` if it exists, otherwise return defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// The byte budget derived from `max_file_size_mb`.
    pub fn max_output_bytes(&self) -> u64 {
        self.max_file_size_mb as u64 * 1024 * 1024
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_width == 0 || self.target_height == 0 {
            return Err(ConfigError::Validation(format!(
                "target dimensions must be positive, got {}x{}",
                self.target_width, self.target_height
            )));
        }
        if self.max_file_size_mb == 0 {
            return Err(ConfigError::Validation(
                "max_file_size_mb must be positive".to_string(),
            ));
        }
        if self.max_photos == 0 {
            return Err(ConfigError::Validation(
                "max_photos must be positive".to_string(),
            ));
        }
        if self.caption.font_size == 0 {
            return Err(ConfigError::Validation(
                "caption.font_size must be positive".to_string(),
            ));
        }
        validate_date_format(&self.caption.date_format)?;
        Ok(())
    }
}

/// Reject strftime patterns chrono cannot format for a naive timestamp.
///
/// Checked by rendering a sample value, not by scanning specifiers: bad
/// specifiers (`%Q`) and specifiers valid only for zoned timestamps (`%z`,
/// `%Z`) both surface as a format error at render time, deep inside the
/// caption path — and `Display::to_string` turns that error into a panic.
fn validate_date_format(pattern: &str) -> Result<(), ConfigError> {
    use std::fmt::Write;
    let sample = chrono::NaiveDateTime::default();
    let mut rendered = String::new();
    if write!(rendered, "{}", sample.format(pattern)).is_err() {
        return Err(ConfigError::Validation(format!(
            "invalid date_format pattern: {pattern:?}"
        )));
    }
    Ok(())
}

/// Return a fully documented stock `config.toml`.
pub fn stock_config_toml() -> String {
    r#"# frameprep configuration. All options shown with their default values;
# delete anything you don't want to override.

# Output bounding box. Images are resized to fit inside this box with the
# aspect ratio preserved.
target_width = 1280
target_height = 800

# Per-image byte budget in MiB. An image that still exceeds this after
# resizing and encoding is dropped from the run.
max_file_size_mb = 3

# At most this many photos per run. When more candidates are found, a uniform
# random subset of exactly this size is processed.
max_photos = 500

# Default log filter when RUST_LOG is not set.
log_level = "info"

[caption]
# Overlay the capture date (and place, when GPS data resolves) on each photo.
enabled = true

# "top" or "bottom"
position = "bottom"

# strftime pattern for the date line.
date_format = "%Y-%m-%d %H:%M"

# Point size for the caption text.
font_size = 50

# Optional explicit font file. When unset, platform default fonts are tried,
# then a builtin bitmap font (smaller glyphs, fixed metrics).
#font_path = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"
"#
    .to_string()
}

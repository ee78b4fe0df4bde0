//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Largest crop fraction accepted per edge.
pub const MAX_CROP_FRACTION: f64 = 0.20;

/// Accepted range for brightness and contrast factors, in percent.
pub const ENHANCE_PERCENT_RANGE: std::ops::RangeInclusive<u32> = 50..=200;

/// Parameters shared by every variant of a batch.
///
/// Immutable once a batch starts; the pipeline only ever reads it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariantConfig {
    /// Brightness factor in percent (100 = unchanged)
    pub brightness: u32,

    /// Contrast factor in percent (100 = unchanged)
    pub contrast: u32,

    /// Fraction trimmed from each edge, 0.0 to 0.20
    pub crop: f64,

    /// Solid black frame width in pixels
    pub border: u32,

    /// Add per-pixel noise
    pub noise: bool,

    /// Apply per-channel intensity-level remapping
    pub color_shift: bool,

    /// Also randomize Make, Model and Copyright
    pub randomize_metadata: bool,
}

impl Default for VariantConfig {
    fn default() -> Self {
        Self {
            brightness: 102,
            contrast: 102,
            crop: 0.02,
            border: 2,
            noise: true,
            color_shift: true,
            randomize_metadata: true,
        }
    }
}

/// Batch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Variants generated per source image
    pub variants_per_image: u32,

    /// Number of variants generated concurrently
    pub parallel_workers: usize,

    /// Seed for the batch random source; drawn from entropy when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Progress events buffered before the runner waits on the consumer
    pub progress_buffer: usize,

    /// Supported input extensions
    pub supported_formats: Vec<String>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            variants_per_image: 5,
            parallel_workers: 4,
            seed: None,
            progress_buffer: 64,
            supported_formats: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "webp".to_string(),
            ],
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum file size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,

    /// Maximum pixels of the worst-case working canvas of one variant
    /// (after rotation growth and border padding)
    pub max_working_pixels: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 100,
            max_image_dimension: 10000,
            max_working_pixels: 120_000_000,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the archive is written to
    pub dir: String,

    /// Archive file name
    pub archive_name: String,

    /// Manifest format ("json" or "jsonl")
    pub manifest_format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: ".".to_string(),
            archive_name: "spoofed_images.zip".to_string(),
            manifest_format: "json".to_string(),
        }
    }
}

impl OutputConfig {
    /// Resolved archive path (with ~ expansion on the directory).
    pub fn archive_path(&self) -> PathBuf {
        let expanded = shellexpand::tilde(&self.dir);
        PathBuf::from(expanded.into_owned()).join(&self.archive_name)
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

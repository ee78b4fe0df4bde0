//! Error types for the reshade variant pipeline.
//!
//! Errors are organized by concern so that callers can tell a bad
//! configuration (surfaced before any work starts) apart from a failure that
//! only affects one source image.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for reshade operations.
#[derive(Error, Debug)]
pub enum ReshadeError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Batch orchestration errors
    #[error("Batch error: {0}")]
    Batch(#[from] BatchError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Per-source pipeline errors, organized by stage.
///
/// Every variant carries the source it concerns so that a batch report can
/// attribute failures without extra bookkeeping.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Image decoding failed
    #[error("Decode error for {source_name}: {message}")]
    Decode {
        source_name: String,
        message: String,
    },

    /// Unsupported image format
    #[error("Unsupported format for {source_name}: {format}")]
    UnsupportedFormat { source_name: String, format: String },

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// File exceeds size limit
    #[error("File too large: {path} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        path: PathBuf,
        size_mb: u64,
        max_mb: u64,
    },

    /// Image dimensions (or the worst-case working canvas) exceed a limit
    #[error("Image too large: {source_name} ({width}x{height}): {reason}")]
    ImageTooLarge {
        source_name: String,
        width: u32,
        height: u32,
        reason: String,
    },

    /// Crop fraction leaves no pixels for this source
    #[error(
        "Degenerate geometry for {source_name}: crop {crop} of {width}x{height} leaves {out_width}x{out_height}"
    )]
    DegenerateGeometry {
        source_name: String,
        crop: f64,
        width: u32,
        height: u32,
        out_width: u32,
        out_height: u32,
    },

    /// Encoding the final variant failed
    #[error("Encode error for {source_name}: {message}")]
    Encode {
        source_name: String,
        message: String,
    },

    /// Building or embedding the metadata container failed
    #[error("Metadata error for {source_name}: {source}")]
    Metadata {
        source_name: String,
        #[source]
        source: MetadataError,
    },
}

/// Failures while writing a metadata container into a JPEG stream.
#[derive(Error, Debug)]
pub enum MetadataError {
    /// The stream does not start with an SOI marker
    #[error("stream does not start with a JPEG SOI marker")]
    NotJpeg,

    /// The serialized container does not fit one APP1 segment
    #[error("EXIF payload too large for one APP1 segment ({0} bytes)")]
    PayloadTooLarge(usize),

    /// Serializing the container to TIFF failed
    #[error("EXIF serialization failed: {0}")]
    Exif(#[from] exif::Error),
}

/// Errors that stop a whole batch.
#[derive(Error, Debug)]
pub enum BatchError {
    /// No source images were supplied
    #[error("No source images supplied. Please provide at least one image.")]
    NoSources,

    /// Variant count below one
    #[error("Invalid variant count {0}: at least one variant per image is required")]
    InvalidVariantCount(u32),

    /// Batch or variant parameters are invalid
    #[error("Invalid batch configuration: {0}")]
    Config(#[from] ConfigError),

    /// The crop fraction leaves no pixels for a source
    #[error("{0}")]
    Geometry(PipelineError),

    /// Every supplied source failed before generation
    #[error("None of the {0} source image(s) could be prepared")]
    NoUsableSources(usize),

    /// The batch was cancelled before completion
    #[error("Batch cancelled after {completed}/{total} variants")]
    Cancelled { completed: usize, total: usize },

    /// A worker task panicked or was aborted
    #[error("Worker task failed: {0}")]
    Worker(String),

    /// Writing the output archive failed
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}

/// Convenience type alias for reshade results.
pub type Result<T> = std::result::Result<T, ReshadeError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

impl PipelineError {
    /// The source this error concerns, when it is attributable to one.
    pub fn source_name(&self) -> Option<&str> {
        match self {
            Self::Decode { source_name, .. }
            | Self::UnsupportedFormat { source_name, .. }
            | Self::ImageTooLarge { source_name, .. }
            | Self::DegenerateGeometry { source_name, .. }
            | Self::Encode { source_name, .. }
            | Self::Metadata { source_name, .. } => Some(source_name),
            Self::FileNotFound(_) | Self::FileTooLarge { .. } => None,
        }
    }

    /// Whether this error stems from configuration rather than image content.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::DegenerateGeometry { .. })
    }
}

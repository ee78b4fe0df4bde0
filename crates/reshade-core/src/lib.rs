//! Reshade Core - image variant generation library.
//!
//! Reshade turns each source image into a configurable number of variants
//! that look the same to a person but differ in every byte and in their
//! embedded identity metadata.
//!
//! # Architecture
//!
//! Each variant runs through a fixed pipeline with an explicit random source:
//!
//! ```text
//! Source → Metadata → Crop → Rotate → Shear → Photometric → Color → Noise → Border → JPEG
//! ```
//!
//! A [`BatchRunner`] fans the pipeline out over (source, variant) pairs with
//! bounded concurrency and packages the results into one ZIP archive.
//!
//! # Usage
//!
//! ```rust,ignore
//! use reshade_core::{BatchRunner, CancelToken, Config, SourceInput};
//!
//! #[tokio::main]
//! async fn main() -> reshade_core::Result<()> {
//!     let config = Config::load()?;
//!     let input = SourceInput::read("./beach.png".as_ref())?;
//!
//!     let report = BatchRunner::new(&config)
//!         .run(vec![input], None, CancelToken::never())
//!         .await?;
//!     report.write_archive(std::fs::File::create("variants.zip")?)?;
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod archive;
pub mod batch;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod types;

// Re-exports for convenient access
pub use archive::{write_archive, ArchiveWriter};
pub use batch::{BatchReport, BatchRunner, SourceFailure, SourceSummary};
pub use config::{Config, VariantConfig};
pub use error::{
    BatchError, ConfigError, MetadataError, PipelineError, PipelineResult, ReshadeError, Result,
};
pub use output::{write_manifest, OutputFormat, OutputWriter};
pub use pipeline::{
    progress_channel, CancelHandle, CancelToken, DiscoveredFile, FileDiscovery, ProcessOptions,
    SourceInput, Validator, VariantGenerator,
};
pub use types::{BatchProgress, Variant, VariantRecord};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

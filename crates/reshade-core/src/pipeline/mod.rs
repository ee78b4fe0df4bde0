//! Variant pipeline components.
//!
//! Stages, in the order the orchestrator runs them:
//! - **metadata**: Synthesize identity tags and embed them as EXIF
//! - **geometry**: Crop, rotate and shear
//! - **photometric**: Brightness, contrast and intensity jitter
//! - **color**: Per-channel intensity-level remapping
//! - **noise**: Per-pixel additive noise
//! - **border**: Solid frame around the canvas
//! - **encode**: JPEG encoding and output naming
//!
//! Supporting modules:
//! - **discovery** / **validate** / **decode**: Find, check and load sources
//! - **hash**: Content and perceptual hashes for the manifest
//! - **processor**: Orchestrates one variant
//! - **channel**: Progress and cancellation channels for batches

pub mod border;
pub mod channel;
pub mod color;
pub mod decode;
pub mod discovery;
pub mod encode;
pub mod geometry;
pub mod hash;
pub mod metadata;
pub mod noise;
pub mod photometric;
pub mod processor;
pub mod validate;

// Re-exports for convenient access
pub use channel::{progress_channel, CancelHandle, CancelToken};
pub use decode::{ImageDecoder, SourceImage, SourceInput};
pub use discovery::{DiscoveredFile, FileDiscovery};
pub use hash::Hasher;
pub use metadata::{BaseMetadata, IdentityTag, MetadataContainer, MetadataSynthesizer};
pub use processor::{ProcessOptions, VariantGenerator};
pub use validate::{SourceSignature, Validator};

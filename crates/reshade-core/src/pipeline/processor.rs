//! Variant orchestration - runs every stage in a fixed order for one variant.
//!
//! ```text
//! metadata → RGB → crop → rotate → shear → photometric → [color] → [noise] → border → JPEG
//! ```

use image::DynamicImage;
use rand::Rng;

use crate::config::VariantConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::types::Variant;

use super::decode::SourceImage;
use super::encode::{embed_metadata, encode_jpeg, random_file_name};
use super::geometry::{self, GeometrySample};
use super::hash::Hasher;
use super::metadata::{BaseMetadata, MetadataSynthesizer};
use super::{border, color, noise, photometric};

/// Options for controlling variant generation.
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    /// Compute a perceptual hash of every final raster
    pub fingerprint: bool,
}

/// Generates variants of a source under one shared configuration.
pub struct VariantGenerator {
    config: VariantConfig,
    hasher: Option<Hasher>,
}

impl VariantGenerator {
    /// Create a generator for the given configuration.
    pub fn new(config: VariantConfig) -> Self {
        Self::with_options(config, &ProcessOptions::default())
    }

    /// Create a generator with custom options.
    pub fn with_options(config: VariantConfig, options: &ProcessOptions) -> Self {
        Self {
            config,
            hasher: options.fingerprint.then(Hasher::new),
        }
    }

    /// The configuration every variant is generated with.
    pub fn config(&self) -> &VariantConfig {
        &self.config
    }

    /// Perceptual hash of a source, when fingerprinting is enabled.
    pub fn fingerprint(&self, source: &SourceImage) -> Option<String> {
        self.hasher
            .as_ref()
            .map(|hasher| hasher.perceptual_hash(&source.image))
    }

    /// Produce one variant of `source`, drawing all randomness from `rng`.
    pub fn generate<R: Rng>(
        &self,
        source: &SourceImage,
        index: u32,
        rng: &mut R,
    ) -> PipelineResult<Variant> {
        let start = std::time::Instant::now();
        let config = &self.config;

        // 1. Identity metadata, from the still-encoded source
        let base = BaseMetadata::probe(&source.encoded);
        let metadata =
            MetadataSynthesizer::synthesize(&base, config.randomize_metadata, rng);

        // 2. Working raster
        let working = source.image.to_rgb8();

        // 3-5. Geometry
        let stage_start = std::time::Instant::now();
        let sample = GeometrySample::draw(rng);
        let cropped = geometry::crop(&working, config);
        drop(working);
        let rotated = geometry::rotate(&cropped, sample.degrees);
        drop(cropped);
        let mut canvas = geometry::shear(&rotated, sample.shear_x, sample.shear_y);
        drop(rotated);
        tracing::trace!(
            "  Geometry ({:.3}°, shear {:.4}/{:.4}): {:?}",
            sample.degrees,
            sample.shear_x,
            sample.shear_y,
            stage_start.elapsed()
        );

        // 6. Photometric
        let stage_start = std::time::Instant::now();
        let delta = photometric::adjust(&mut canvas, config.brightness, config.contrast, rng);
        tracing::trace!("  Photometric (offset {delta}): {:?}", stage_start.elapsed());

        // 7. Color perturbation
        if config.color_shift {
            color::apply(&mut canvas, rng);
        }

        // 8. Noise
        if config.noise {
            noise::apply(&mut canvas, rng);
        }

        // 9. Border
        let canvas = border::add_border(canvas, config.border);

        // 10. Encode
        let stage_start = std::time::Instant::now();
        let jpeg = encode_jpeg(&canvas).map_err(|e| PipelineError::Encode {
            source_name: source.name.clone(),
            message: e.to_string(),
        })?;
        let bytes = embed_metadata(jpeg, &metadata).map_err(|e| PipelineError::Metadata {
            source_name: source.name.clone(),
            source: e,
        })?;
        tracing::trace!("  Encode: {:?}", stage_start.elapsed());

        let (width, height) = canvas.dimensions();
        let fingerprint = self
            .hasher
            .as_ref()
            .map(|hasher| hasher.perceptual_hash(&DynamicImage::ImageRgb8(canvas)));
        let name = random_file_name(rng);

        tracing::debug!(
            "Generated {} from {} #{} in {:?} ({}x{})",
            name,
            source.name,
            index,
            start.elapsed(),
            width,
            height
        );

        Ok(Variant {
            name,
            source_name: source.name.clone(),
            index,
            width,
            height,
            bytes,
            metadata,
            fingerprint,
        })
    }
}

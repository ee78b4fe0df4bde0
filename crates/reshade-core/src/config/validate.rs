//! Configuration validation with range checks.

use crate::error::{ConfigError, PipelineError};

use super::{Config, VariantConfig, ENHANCE_PERCENT_RANGE, MAX_CROP_FRACTION};

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.variant.validate()?;
        if self.batch.variants_per_image == 0 {
            return Err(ConfigError::ValidationError(
                "batch.variants_per_image must be >= 1".into(),
            ));
        }
        if self.batch.parallel_workers == 0 {
            return Err(ConfigError::ValidationError(
                "batch.parallel_workers must be > 0".into(),
            ));
        }
        if self.batch.progress_buffer == 0 {
            return Err(ConfigError::ValidationError(
                "batch.progress_buffer must be > 0".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.limits.max_working_pixels == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_working_pixels must be > 0".into(),
            ));
        }
        if crate::output::OutputFormat::parse(&self.output.manifest_format).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "output.manifest_format must be \"json\" or \"jsonl\", got {:?}",
                self.output.manifest_format
            )));
        }
        if self.output.archive_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "output.archive_name must not be empty".into(),
            ));
        }
        Ok(())
    }
}

impl VariantConfig {
    /// Validate the documented ranges of every transform parameter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !ENHANCE_PERCENT_RANGE.contains(&self.brightness) {
            return Err(ConfigError::ValidationError(format!(
                "variant.brightness must be between 50 and 200, got {}",
                self.brightness
            )));
        }
        if !ENHANCE_PERCENT_RANGE.contains(&self.contrast) {
            return Err(ConfigError::ValidationError(format!(
                "variant.contrast must be between 50 and 200, got {}",
                self.contrast
            )));
        }
        if !self.crop.is_finite() || self.crop < 0.0 || self.crop > MAX_CROP_FRACTION {
            return Err(ConfigError::ValidationError(format!(
                "variant.crop must be between 0.0 and 0.20, got {}",
                self.crop
            )));
        }
        Ok(())
    }

    /// Pixels trimmed from each side for a source of the given size.
    pub fn crop_margins(&self, width: u32, height: u32) -> (u32, u32) {
        let dx = (f64::from(width) * self.crop).floor() as u32;
        let dy = (f64::from(height) * self.crop).floor() as u32;
        (dx, dy)
    }

    /// Check that cropping a `width`x`height` source leaves a non-empty image.
    ///
    /// Run for every source before generation starts so that a degenerate
    /// configuration is reported up front instead of mid-batch.
    pub fn check_geometry(
        &self,
        source_name: &str,
        width: u32,
        height: u32,
    ) -> Result<(u32, u32), PipelineError> {
        let (dx, dy) = self.crop_margins(width, height);
        let out_width = width.saturating_sub(dx.saturating_mul(2));
        let out_height = height.saturating_sub(dy.saturating_mul(2));
        if out_width == 0 || out_height == 0 {
            return Err(PipelineError::DegenerateGeometry {
                source_name: source_name.to_string(),
                crop: self.crop,
                width,
                height,
                out_width,
                out_height,
            });
        }
        Ok((out_width, out_height))
    }
}

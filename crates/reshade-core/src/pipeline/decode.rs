//! Source decoding with format detection and resource limits.

use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;
use std::path::Path;

use crate::config::{LimitsConfig, VariantConfig};
use crate::error::PipelineError;

use super::geometry;

/// An encoded source as supplied by the caller.
#[derive(Debug, Clone)]
pub struct SourceInput {
    /// Display name, usually the file name
    pub name: String,
    /// Encoded image bytes
    pub bytes: Vec<u8>,
}

impl SourceInput {
    /// Wrap an in-memory encoded image.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Read a source from disk, naming it after the file.
    pub fn read(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();
        Ok(Self { name, bytes })
    }
}

/// A decoded source, read-only for the duration of a batch.
///
/// The encoded bytes are kept alongside the raster because the metadata
/// stage probes the still-encoded stream.
#[derive(Debug)]
pub struct SourceImage {
    /// Display name
    pub name: String,
    /// Decoded raster (any color type; the pipeline converts to RGB)
    pub image: DynamicImage,
    /// Original encoded stream
    pub encoded: Vec<u8>,
    /// Detected format
    pub format: ImageFormat,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Perceptual hash, filled in when fingerprinting is enabled
    pub fingerprint: Option<String>,
}

/// Image decoder with configurable limits.
pub struct ImageDecoder {
    limits: LimitsConfig,
}

impl ImageDecoder {
    /// Create a new decoder with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Decode a source and enforce dimension limits.
    pub fn decode(&self, input: SourceInput) -> Result<SourceImage, PipelineError> {
        let SourceInput { name, bytes } = input;

        let reader = image::ImageReader::new(Cursor::new(bytes.as_slice()))
            .with_guessed_format()
            .map_err(|e| PipelineError::Decode {
                source_name: name.clone(),
                message: format!("Cannot detect image format: {}", e),
            })?;
        let format = match reader.format() {
            Some(f) => f,
            None => {
                ImageFormat::from_path(&name).map_err(|_| PipelineError::UnsupportedFormat {
                    source_name: name.clone(),
                    format: Path::new(&name)
                        .extension()
                        .and_then(|e| e.to_str())
                        .unwrap_or("unknown")
                        .to_string(),
                })?
            }
        };
        let image = reader.decode().map_err(|e| PipelineError::Decode {
            source_name: name.clone(),
            message: e.to_string(),
        })?;

        let (width, height) = image.dimensions();
        if width > self.limits.max_image_dimension || height > self.limits.max_image_dimension {
            return Err(PipelineError::ImageTooLarge {
                source_name: name,
                width,
                height,
                reason: format!(
                    "exceeds max dimension {}",
                    self.limits.max_image_dimension
                ),
            });
        }

        Ok(SourceImage {
            name,
            image,
            encoded: bytes,
            format,
            width,
            height,
            fingerprint: None,
        })
    }

    /// Check that one variant of this source fits the working-memory bound.
    pub fn check_working_set(
        &self,
        source: &SourceImage,
        config: &VariantConfig,
    ) -> Result<(), PipelineError> {
        let pixels = geometry::worst_case_pixels(source.width, source.height, config);
        if pixels > self.limits.max_working_pixels {
            return Err(PipelineError::ImageTooLarge {
                source_name: source.name.clone(),
                width: source.width,
                height: source.height,
                reason: format!(
                    "working canvas of {} pixels exceeds limit {}",
                    pixels, self.limits.max_working_pixels
                ),
            });
        }
        Ok(())
    }
}

/// Convert an ImageFormat to a string representation.
pub fn format_to_string(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "jpeg".to_string(),
        ImageFormat::Png => "png".to_string(),
        ImageFormat::WebP => "webp".to_string(),
        ImageFormat::Gif => "gif".to_string(),
        ImageFormat::Tiff => "tiff".to_string(),
        ImageFormat::Bmp => "bmp".to_string(),
        _ => "unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 128]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_format_to_string() {
        assert_eq!(format_to_string(ImageFormat::Jpeg), "jpeg");
        assert_eq!(format_to_string(ImageFormat::Png), "png");
        assert_eq!(format_to_string(ImageFormat::WebP), "webp");
    }

    #[test]
    fn test_decode_detects_format_by_content() {
        let decoder = ImageDecoder::new(LimitsConfig::default());
        let source = decoder
            .decode(SourceInput::new("misnamed.jpg", png_bytes(12, 7)))
            .unwrap();
        assert_eq!(source.format, ImageFormat::Png);
        assert_eq!((source.width, source.height), (12, 7));
        assert!(source.fingerprint.is_none());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let decoder = ImageDecoder::new(LimitsConfig::default());
        let err = decoder
            .decode(SourceInput::new("noise.png", vec![1, 2, 3, 4, 5]))
            .unwrap_err();
        assert_eq!(err.source_name(), Some("noise.png"));
    }

    #[test]
    fn test_decode_enforces_dimension_limit() {
        let limits = LimitsConfig {
            max_image_dimension: 8,
            ..LimitsConfig::default()
        };
        let decoder = ImageDecoder::new(limits);
        let err = decoder
            .decode(SourceInput::new("wide.png", png_bytes(9, 2)))
            .unwrap_err();
        assert!(matches!(err, PipelineError::ImageTooLarge { .. }));
    }

    #[test]
    fn test_working_set_limit() {
        let limits = LimitsConfig {
            max_working_pixels: 100,
            ..LimitsConfig::default()
        };
        let decoder = ImageDecoder::new(limits);
        let source = decoder
            .decode(SourceInput::new("a.png", png_bytes(20, 20)))
            .unwrap();
        let err = decoder
            .check_working_set(&source, &VariantConfig::default())
            .unwrap_err();
        assert!(err.to_string().contains("working canvas"));
    }
}

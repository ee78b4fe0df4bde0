//! Final encoding: JPEG at a fixed quality with the identity container embedded.

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, RgbImage};
use rand::Rng;

use super::metadata::{embed_exif, random_alphanumeric, MetadataContainer};
use crate::error::MetadataError;

/// Encoder quality on the 0-100 scale.
pub const JPEG_QUALITY: u8 = 94;

/// Extension of every generated file.
pub const OUTPUT_EXTENSION: &str = "jpg";

/// Length range of the random file name base.
pub const NAME_LEN_RANGE: std::ops::RangeInclusive<usize> = 12..=16;

/// Encode the raster as a baseline JPEG.
pub fn encode_jpeg(image: &RgbImage) -> image::ImageResult<Vec<u8>> {
    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY).encode(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgb8,
    )?;
    Ok(jpeg)
}

/// Splice the metadata container into an encoded JPEG.
pub fn embed_metadata(
    jpeg: Vec<u8>,
    metadata: &MetadataContainer,
) -> Result<Vec<u8>, MetadataError> {
    if metadata.is_empty() {
        return Ok(jpeg);
    }
    let tiff = metadata.to_tiff()?;
    embed_exif(&jpeg, &tiff)
}

/// Random output file name: 12-16 alphanumeric characters plus the extension.
pub fn random_file_name<R: Rng>(rng: &mut R) -> String {
    let len = rng.gen_range(NAME_LEN_RANGE);
    format!("{}.{}", random_alphanumeric(rng, len), OUTPUT_EXTENSION)
}

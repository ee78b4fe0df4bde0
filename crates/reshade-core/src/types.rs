//! Core data types produced by the variant pipeline.

use serde::{Deserialize, Serialize};

use crate::pipeline::hash::Hasher;
use crate::pipeline::metadata::MetadataContainer;

/// One encoded output image derived from a source.
///
/// Holds only the encoded stream; the working raster is dropped as soon as
/// encoding finishes.
#[derive(Debug, Clone)]
pub struct Variant {
    /// Generated file name (random alphanumeric base + `.jpg`)
    pub name: String,

    /// Name of the source this variant was derived from
    pub source_name: String,

    /// Zero-based index among the variants of its source
    pub index: u32,

    /// Encoded width in pixels
    pub width: u32,

    /// Encoded height in pixels
    pub height: u32,

    /// JPEG stream with the synthesized EXIF segment embedded
    pub bytes: Vec<u8>,

    /// Identity tags embedded in `bytes`
    pub metadata: MetadataContainer,

    /// Perceptual hash of the final raster, when fingerprinting is enabled
    pub fingerprint: Option<String>,
}

impl Variant {
    /// BLAKE3 hash of the encoded stream.
    pub fn content_hash(&self) -> String {
        Hasher::content_hash_from_bytes(&self.bytes)
    }

    /// Size of the encoded stream in bytes.
    pub fn file_size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Manifest entry describing one generated variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantRecord {
    /// Source file name
    pub source: String,

    /// Archive entry name
    pub name: String,

    /// Variant index within its source
    pub index: u32,

    /// Encoded width in pixels
    pub width: u32,

    /// Encoded height in pixels
    pub height: u32,

    /// Encoded size in bytes
    pub file_size: u64,

    /// BLAKE3 hash of the encoded stream
    pub content_hash: String,

    /// Hamming distance between source and variant perceptual hashes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub perceptual_distance: Option<u32>,

    /// Synthesized identity tags
    pub metadata: MetadataContainer,
}

impl VariantRecord {
    /// Build a manifest record, comparing against the source fingerprint if both exist.
    pub fn new(variant: &Variant, source_fingerprint: Option<&str>) -> Self {
        let perceptual_distance = match (source_fingerprint, variant.fingerprint.as_deref()) {
            (Some(source), Some(own)) => Hasher::perceptual_distance(source, own),
            _ => None,
        };
        Self {
            source: variant.source_name.clone(),
            name: variant.name.clone(),
            index: variant.index,
            width: variant.width,
            height: variant.height,
            file_size: variant.file_size(),
            content_hash: variant.content_hash(),
            perceptual_distance,
            metadata: variant.metadata.clone(),
        }
    }
}

/// Progress of a running batch, sent after every finished variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    /// Variants finished so far (successfully or not)
    pub completed: usize,
    /// Variants requested in total
    pub total: usize,
}

impl BatchProgress {
    /// Completed fraction in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::metadata::IdentityTag;

    fn sample_variant() -> Variant {
        let mut metadata = MetadataContainer::default();
        metadata.set(IdentityTag::Software, "abcdefghijkl");
        Variant {
            name: "Zx81kLmn0pQr.jpg".into(),
            source_name: "beach.png".into(),
            index: 2,
            width: 800,
            height: 600,
            bytes: vec![0xFF, 0xD8, 0xFF, 0xD9],
            metadata,
            fingerprint: None,
        }
    }

    #[test]
    fn test_record_copies_variant_fields() {
        let variant = sample_variant();
        let record = VariantRecord::new(&variant, Some("ignored"));
        assert_eq!(record.source, "beach.png");
        assert_eq!(record.index, 2);
        assert_eq!(record.file_size, 4);
        assert_eq!(record.content_hash.len(), 64);
        assert!(record.perceptual_distance.is_none());
    }

    #[test]
    fn test_record_serializes_metadata_by_tag_name() {
        let record = VariantRecord::new(&sample_variant(), None);
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"Software\":\"abcdefghijkl\""));
        assert!(!json.contains("perceptual_distance"));
    }

    #[test]
    fn test_progress_fraction() {
        let progress = BatchProgress {
            completed: 3,
            total: 12,
        };
        assert!((progress.fraction() - 0.25).abs() < f64::EPSILON);
        let empty = BatchProgress {
            completed: 0,
            total: 0,
        };
        assert!((empty.fraction() - 1.0).abs() < f64::EPSILON);
    }
}

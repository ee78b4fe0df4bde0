//! Identity metadata synthesis and EXIF embedding.
//!
//! Every variant gets a fresh container of random identity tags. The source's
//! own EXIF is probed only to classify it; its contents never reach the output.
//! Embedding happens entirely in memory: the container is serialized to a TIFF
//! structure and spliced into the JPEG stream as an APP1 segment.

use std::collections::BTreeMap;
use std::io::Cursor;

use exif::experimental::Writer;
use exif::{Field, In, Reader, Tag, Value};

use crate::error::MetadataError;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Length of every synthesized tag value.
pub const TAG_VALUE_LEN: usize = 12;

const APP1_EXIF_HEADER: &[u8; 6] = b"Exif\0\0";

/// Identity tags the synthesizer writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IdentityTag {
    Software,
    Artist,
    ImageDescription,
    Make,
    Model,
    Copyright,
}

impl IdentityTag {
    /// Tags overwritten for every variant.
    pub const BASE: [IdentityTag; 3] = [Self::Software, Self::Artist, Self::ImageDescription];

    /// Tags overwritten only when extended randomization is on.
    pub const EXTENDED: [IdentityTag; 3] = [Self::Make, Self::Model, Self::Copyright];

    /// The EXIF tag this identity maps to (all live in the primary IFD).
    pub fn exif_tag(self) -> Tag {
        match self {
            Self::Software => Tag::Software,
            Self::Artist => Tag::Artist,
            Self::ImageDescription => Tag::ImageDescription,
            Self::Make => Tag::Make,
            Self::Model => Tag::Model,
            Self::Copyright => Tag::Copyright,
        }
    }

    fn all() -> impl Iterator<Item = IdentityTag> {
        Self::BASE.into_iter().chain(Self::EXTENDED)
    }
}

/// What probing the source for an existing EXIF container found.
///
/// The synthesizer treats every outcome the same way (empty base), but the
/// distinction is kept so callers can log or act on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseMetadata {
    /// The source carries no EXIF container
    Absent,
    /// A container exists but could not be parsed
    Unreadable(String),
    /// A container was parsed with this many fields
    Present { fields: usize },
}

impl BaseMetadata {
    /// Probe an encoded source stream for EXIF. Never fails.
    pub fn probe(encoded: &[u8]) -> Self {
        let mut cursor = Cursor::new(encoded);
        match Reader::new().read_from_container(&mut cursor) {
            Ok(exif) => Self::Present {
                fields: exif.fields().count(),
            },
            Err(exif::Error::NotFound(_)) => Self::Absent,
            Err(e) => Self::Unreadable(e.to_string()),
        }
    }
}

/// Identity tags embedded into one variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataContainer {
    tags: BTreeMap<IdentityTag, String>,
}

impl MetadataContainer {
    /// Set (or overwrite) a tag value.
    pub fn set(&mut self, tag: IdentityTag, value: impl Into<String>) {
        self.tags.insert(tag, value.into());
    }

    /// Get a tag value.
    pub fn get(&self, tag: IdentityTag) -> Option<&str> {
        self.tags.get(&tag).map(String::as_str)
    }

    /// Number of tags set.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Whether no tags are set.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Iterate tags in tag order.
    pub fn iter(&self) -> impl Iterator<Item = (IdentityTag, &str)> {
        self.tags.iter().map(|(tag, value)| (*tag, value.as_str()))
    }

    /// Serialize the container as a little-endian TIFF structure (APP1 payload body).
    pub fn to_tiff(&self) -> Result<Vec<u8>, exif::Error> {
        let fields: Vec<Field> = self
            .tags
            .iter()
            .map(|(tag, value)| Field {
                tag: tag.exif_tag(),
                ifd_num: In::PRIMARY,
                value: Value::Ascii(vec![value.clone().into_bytes()]),
            })
            .collect();

        let mut writer = Writer::new();
        for field in &fields {
            writer.push_field(field);
        }
        let mut buf = Cursor::new(Vec::new());
        writer.write(&mut buf, true)?;
        Ok(buf.into_inner())
    }

    /// Read identity tags back out of an encoded image.
    ///
    /// Returns `None` if the stream has no readable EXIF container.
    pub fn read_from(encoded: &[u8]) -> Option<Self> {
        let exif = Reader::new()
            .read_from_container(&mut Cursor::new(encoded))
            .ok()?;

        let mut container = Self::default();
        for tag in IdentityTag::all() {
            let Some(field) = exif.get_field(tag.exif_tag(), In::PRIMARY) else {
                continue;
            };
            if let Value::Ascii(values) = &field.value {
                if let Some(first) = values.first() {
                    container.set(tag, String::from_utf8_lossy(first).into_owned());
                }
            }
        }
        Some(container)
    }
}

/// Builds fresh identity containers.
pub struct MetadataSynthesizer;

impl MetadataSynthesizer {
    /// Synthesize a container on top of the probed base.
    ///
    /// Software, Artist and ImageDescription are always written; Make, Model
    /// and Copyright are added when `randomize_extended` is set.
    pub fn synthesize<R: Rng>(
        base: &BaseMetadata,
        randomize_extended: bool,
        rng: &mut R,
    ) -> MetadataContainer {
        match base {
            BaseMetadata::Absent => tracing::trace!("Source has no EXIF; starting from empty base"),
            BaseMetadata::Unreadable(reason) => {
                tracing::debug!("Source EXIF unreadable ({reason}); starting from empty base")
            }
            BaseMetadata::Present { fields } => {
                tracing::trace!("Source EXIF has {fields} fields; not carried over")
            }
        }

        let mut container = MetadataContainer::default();
        for tag in IdentityTag::BASE {
            container.set(tag, random_alphanumeric(rng, TAG_VALUE_LEN));
        }
        if randomize_extended {
            for tag in IdentityTag::EXTENDED {
                container.set(tag, random_alphanumeric(rng, TAG_VALUE_LEN));
            }
        }
        container
    }
}

/// Random ASCII letters and digits.
pub fn random_alphanumeric<R: Rng>(rng: &mut R, len: usize) -> String {
    (0..len).map(|_| char::from(rng.sample(Alphanumeric))).collect()
}

/// Splice a TIFF-encoded EXIF structure into a JPEG stream as an APP1 segment.
///
/// The segment is placed after the JFIF APP0 header when one is present,
/// otherwise directly after SOI.
pub fn embed_exif(jpeg: &[u8], tiff: &[u8]) -> Result<Vec<u8>, MetadataError> {
    if jpeg.len() < 4 || jpeg[0] != 0xFF || jpeg[1] != 0xD8 {
        return Err(MetadataError::NotJpeg);
    }

    let segment_len = 2 + APP1_EXIF_HEADER.len() + tiff.len();
    let segment_len =
        u16::try_from(segment_len).map_err(|_| MetadataError::PayloadTooLarge(segment_len))?;

    let mut insert_at = 2;
    if jpeg.len() >= 6 && jpeg[2] == 0xFF && jpeg[3] == 0xE0 {
        let app0_len = usize::from(u16::from_be_bytes([jpeg[4], jpeg[5]]));
        if 4 + app0_len <= jpeg.len() {
            insert_at = 4 + app0_len;
        }
    }

    let mut out = Vec::with_capacity(jpeg.len() + usize::from(segment_len) + 2);
    out.extend_from_slice(&jpeg[..insert_at]);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&segment_len.to_be_bytes());
    out.extend_from_slice(APP1_EXIF_HEADER);
    out.extend_from_slice(tiff);
    out.extend_from_slice(&jpeg[insert_at..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::jpeg::JpegEncoder;
    use image::{ExtendedColorType, RgbImage};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn tiny_jpeg() -> Vec<u8> {
        let img = RgbImage::from_pixel(8, 8, image::Rgb([120, 60, 200]));
        let mut buf = Vec::new();
        JpegEncoder::new_with_quality(&mut buf, 90)
            .encode(img.as_raw(), 8, 8, ExtendedColorType::Rgb8)
            .unwrap();
        buf
    }

    #[test]
    fn test_synthesize_base_tags_only() {
        let mut rng = StdRng::seed_from_u64(1);
        let container = MetadataSynthesizer::synthesize(&BaseMetadata::Absent, false, &mut rng);
        assert_eq!(container.len(), 3);
        for tag in IdentityTag::BASE {
            let value = container.get(tag).unwrap();
            assert_eq!(value.len(), TAG_VALUE_LEN);
            assert!(value.chars().all(|c| c.is_ascii_alphanumeric()));
        }
        assert!(container.get(IdentityTag::Make).is_none());
    }

    #[test]
    fn test_synthesize_extended_tags() {
        let mut rng = StdRng::seed_from_u64(2);
        let base = BaseMetadata::Unreadable("truncated".into());
        let container = MetadataSynthesizer::synthesize(&base, true, &mut rng);
        assert_eq!(container.len(), 6);
        assert!(container.get(IdentityTag::Copyright).is_some());
    }

    #[test]
    fn test_consecutive_containers_differ() {
        let mut rng = StdRng::seed_from_u64(3);
        let a = MetadataSynthesizer::synthesize(&BaseMetadata::Absent, true, &mut rng);
        let b = MetadataSynthesizer::synthesize(&BaseMetadata::Absent, true, &mut rng);
        for tag in IdentityTag::BASE {
            assert_ne!(a.get(tag), b.get(tag));
        }
    }

    #[test]
    fn test_probe_without_exif_is_absent_or_unreadable() {
        let probed = BaseMetadata::probe(&tiny_jpeg());
        assert!(!matches!(probed, BaseMetadata::Present { .. }));
    }

    #[test]
    fn test_probe_garbage_never_panics() {
        let probed = BaseMetadata::probe(b"definitely not an image");
        assert!(!matches!(probed, BaseMetadata::Present { .. }));
    }

    #[test]
    fn test_embed_and_read_back() {
        let mut rng = StdRng::seed_from_u64(4);
        let container = MetadataSynthesizer::synthesize(&BaseMetadata::Absent, true, &mut rng);
        let tiff = container.to_tiff().unwrap();
        let jpeg = embed_exif(&tiny_jpeg(), &tiff).unwrap();

        assert!(matches!(
            BaseMetadata::probe(&jpeg),
            BaseMetadata::Present { fields: 6 }
        ));
        let read = MetadataContainer::read_from(&jpeg).unwrap();
        assert_eq!(read, container);

        // The spliced stream still decodes.
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!(decoded.width(), 8);
    }

    #[test]
    fn test_embed_rejects_non_jpeg() {
        assert!(matches!(
            embed_exif(b"\x89PNG\r\n\x1a\n", b"II*\0"),
            Err(MetadataError::NotJpeg)
        ));
    }

    #[test]
    fn test_embed_rejects_oversized_payload() {
        let tiff = vec![0u8; usize::from(u16::MAX)];
        assert!(matches!(
            embed_exif(&tiny_jpeg(), &tiff),
            Err(MetadataError::PayloadTooLarge(len)) if len > usize::from(u16::MAX)
        ));
    }

    #[test]
    fn test_embed_places_segment_after_app0() {
        let jpeg = tiny_jpeg();
        let out = embed_exif(&jpeg, b"II*\0\x08\0\0\0\0\0").unwrap();
        assert_eq!(&out[..2], &[0xFF, 0xD8]);
        let app1 = out.windows(2).position(|w| w == [0xFF, 0xE1]).unwrap();
        if jpeg[2..4] == [0xFF, 0xE0] {
            assert!(app1 > 4);
        } else {
            assert_eq!(app1, 2);
        }
        assert_eq!(&out[app1 + 4..app1 + 10], APP1_EXIF_HEADER);
    }
}

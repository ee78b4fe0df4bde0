//! Content and perceptual hashing for variant distinctness checks.

use blake3::Hasher as Blake3Hasher;
use image::DynamicImage;
use image_hasher::{HashAlg, HasherConfig, ImageHash};

/// Provides content hashing and perceptual hashing for images.
///
/// The perceptual hasher is pre-configured once and reused for every raster.
pub struct Hasher {
    phash_hasher: image_hasher::Hasher,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a new hasher with a pre-configured perceptual hash algorithm.
    pub fn new() -> Self {
        let phash_hasher = HasherConfig::new()
            .hash_alg(HashAlg::DoubleGradient)
            .hash_size(16, 16)
            .to_hasher();
        Self { phash_hasher }
    }

    /// Generate a BLAKE3 hash from an in-memory byte buffer.
    pub fn content_hash_from_bytes(data: &[u8]) -> String {
        let mut hasher = Blake3Hasher::new();
        hasher.update(data);
        hasher.finalize().to_hex().to_string()
    }

    /// Generate a perceptual hash of a raster.
    ///
    /// Similar images produce hashes with a small Hamming distance, which lets
    /// a manifest report how far each variant drifted from its source.
    pub fn perceptual_hash(&self, image: &DynamicImage) -> String {
        let hash = self.phash_hasher.hash_image(image);
        hash.to_base64()
    }

    /// Compare two perceptual hashes and return their Hamming distance.
    ///
    /// Returns `None` if either hash is invalid.
    pub fn perceptual_distance(hash1: &str, hash2: &str) -> Option<u32> {
        let h1 = ImageHash::<Vec<u8>>::from_base64(hash1).ok()?;
        let h2 = ImageHash::<Vec<u8>>::from_base64(hash2).ok()?;
        Some(h1.dist(&h2))
    }
}

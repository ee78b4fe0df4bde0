//! Stochastic stage: independent per-pixel, per-channel additive noise.

use image::RgbImage;
use rand::Rng;

/// Range of the additive noise, drawn independently for every sample.
pub const NOISE_RANGE: std::ops::RangeInclusive<i16> = -2..=2;

/// Add independent uniform noise to every channel of every pixel, clipping to [0, 255].
pub fn apply<R: Rng>(image: &mut RgbImage, rng: &mut R) {
    for value in image.iter_mut() {
        let noisy = i16::from(*value) + rng.gen_range(NOISE_RANGE);
        *value = noisy.clamp(0, 255) as u8;
    }
}

//! Color perturbation stage: per-channel intensity-level remapping.
//!
//! Each channel gets its own 256-entry lookup table. The random offset is
//! drawn per intensity level, not per pixel, so every pixel that shares a level
//! in a channel moves by the same amount.

use image::RgbImage;
use rand::Rng;

/// Range of the per-level offset.
pub const LEVEL_SHIFT_RANGE: std::ops::RangeInclusive<i16> = -3..=3;

/// A 256-entry lookup table for one channel.
pub type LevelTable = [u8; 256];

/// Build one table: level `v` maps to `clip(v + d_v)` with an independent `d_v` per level.
pub fn random_table<R: Rng>(rng: &mut R) -> LevelTable {
    let mut table = [0u8; 256];
    for (level, entry) in table.iter_mut().enumerate() {
        let shifted = level as i16 + rng.gen_range(LEVEL_SHIFT_RANGE);
        *entry = shifted.clamp(0, 255) as u8;
    }
    table
}

/// Remap each channel through its own table.
pub fn remap(image: &mut RgbImage, tables: &[LevelTable; 3]) {
    for pixel in image.pixels_mut() {
        for (channel, value) in pixel.0.iter_mut().enumerate() {
            *value = tables[channel][usize::from(*value)];
        }
    }
}

/// Draw fresh tables for red, green and blue and apply them.
pub fn apply<R: Rng>(image: &mut RgbImage, rng: &mut R) {
    let tables = [random_table(rng), random_table(rng), random_table(rng)];
    remap(image, &tables);
}

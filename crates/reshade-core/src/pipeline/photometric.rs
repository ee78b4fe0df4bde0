//! Photometric stage: brightness and contrast enhancement plus a global jitter.

use image::RgbImage;
use rand::Rng;

/// Global intensity offset range, drawn once per variant.
pub const JITTER_RANGE: std::ops::RangeInclusive<i16> = -2..=2;

/// Scale every intensity by `factor` (0 = black, 1 = unchanged).
pub fn brighten(image: &mut RgbImage, factor: f32) {
    for value in image.iter_mut() {
        *value = clamp_u8(f32::from(*value) * factor);
    }
}

/// Scale intensities around the mean grey level by `factor`.
///
/// The mean is taken over the ITU-R 601 luma of the whole image, rounded to
/// an integer level, so a uniform image stays unchanged at any factor.
pub fn contrast(image: &mut RgbImage, factor: f32) {
    let mean = f32::from(mean_luma(image));
    for value in image.iter_mut() {
        *value = clamp_u8(mean + (f32::from(*value) - mean) * factor);
    }
}

/// Add the same integer offset to every channel of every pixel, clipping to [0, 255].
pub fn offset(image: &mut RgbImage, delta: i16) {
    if delta == 0 {
        return;
    }
    for value in image.iter_mut() {
        *value = (i16::from(*value) + delta).clamp(0, 255) as u8;
    }
}

/// Run the full stage: brightness, contrast, then one sampled global offset.
///
/// `brightness` and `contrast` are percentages (100 = unchanged). Returns the
/// sampled offset.
pub fn adjust<R: Rng>(image: &mut RgbImage, brightness: u32, contrast_pct: u32, rng: &mut R) -> i16 {
    if brightness != 100 {
        brighten(image, brightness as f32 / 100.0);
    }
    if contrast_pct != 100 {
        contrast(image, contrast_pct as f32 / 100.0);
    }
    let delta = rng.gen_range(JITTER_RANGE);
    offset(image, delta);
    delta
}

/// Mean luma level of the image, rounded to the nearest integer.
fn mean_luma(image: &RgbImage) -> u8 {
    let pixels = u64::from(image.width()) * u64::from(image.height());
    if pixels == 0 {
        return 0;
    }
    let sum: u64 = image
        .pixels()
        .map(|p| {
            let [r, g, b] = p.0;
            (u64::from(r) * 299 + u64::from(g) * 587 + u64::from(b) * 114 + 500) / 1000
        })
        .sum();
    ((sum + pixels / 2) / pixels) as u8
}

fn clamp_u8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_brighten_scales_and_clips() {
        let mut img = RgbImage::from_pixel(2, 2, Rgb([100, 200, 0]));
        brighten(&mut img, 1.5);
        assert_eq!(*img.get_pixel(0, 0), Rgb([150, 255, 0]));
    }

    #[test]
    fn test_contrast_preserves_uniform_image() {
        let mut img = RgbImage::from_pixel(4, 4, Rgb([90, 90, 90]));
        contrast(&mut img, 2.0);
        assert_eq!(*img.get_pixel(3, 3), Rgb([90, 90, 90]));
    }

    #[test]
    fn test_contrast_spreads_around_mean() {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([100, 100, 100]));
        img.put_pixel(1, 0, Rgb([140, 140, 140]));
        contrast(&mut img, 2.0);
        assert_eq!(*img.get_pixel(0, 0), Rgb([80, 80, 80]));
        assert_eq!(*img.get_pixel(1, 0), Rgb([160, 160, 160]));
    }

    #[test]
    fn test_negative_offset_clips_at_zero() {
        let mut img = RgbImage::from_pixel(1, 1, Rgb([0, 1, 2]));
        offset(&mut img, -2);
        assert_eq!(*img.get_pixel(0, 0), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_positive_offset_clips_at_max() {
        let mut img = RgbImage::from_pixel(1, 1, Rgb([253, 254, 255]));
        offset(&mut img, 2);
        assert_eq!(*img.get_pixel(0, 0), Rgb([255, 255, 255]));
    }

    #[test]
    fn test_offset_is_reversible_away_from_the_ends() {
        let mut img = RgbImage::from_pixel(1, 1, Rgb([10, 128, 245]));
        offset(&mut img, 2);
        offset(&mut img, -2);
        assert_eq!(*img.get_pixel(0, 0), Rgb([10, 128, 245]));
    }

    #[test]
    fn test_adjust_applies_single_offset() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut img = RgbImage::from_pixel(16, 16, Rgb([128, 128, 128]));
        let delta = adjust(&mut img, 100, 100, &mut rng);
        assert!(JITTER_RANGE.contains(&delta));
        let expected = (128 + delta) as u8;
        assert!(img.pixels().all(|p| p.0 == [expected; 3]));
    }

    #[test]
    fn test_mean_luma_weights_green_heaviest() {
        let green = RgbImage::from_pixel(1, 1, Rgb([0, 255, 0]));
        let blue = RgbImage::from_pixel(1, 1, Rgb([0, 0, 255]));
        assert!(mean_luma(&green) > mean_luma(&blue));
        assert_eq!(mean_luma(&RgbImage::new(0, 0)), 0);
    }
}

//! Geometric stage: symmetric crop, micro-rotation and shear warp.
//!
//! Crop runs first so the later resampling steps never touch pixels that are
//! about to be discarded.

use image::{imageops, Rgb, RgbImage};
use imageproc::geometric_transformations::{warp_into_with, warp_with, Interpolation};
use rand::Rng;
use std::ops::RangeInclusive;

use crate::config::VariantConfig;

/// Largest absolute rotation, in degrees.
pub const MAX_ROTATION_DEGREES: f32 = 1.2;

/// Range each shear coefficient is drawn from.
pub const SHEAR_RANGE: RangeInclusive<f32> = 0.003..=0.007;

/// Fill for pixels exposed by rotation or shear.
pub const BACKGROUND: Rgb<u8> = Rgb([0, 0, 0]);

/// Edge replication needed for a full 4x4 bicubic neighbourhood at the border.
const RESAMPLE_PAD: u32 = 2;

/// Parameters sampled for one pass of the geometric stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometrySample {
    /// Rotation in degrees, counter-clockwise
    pub degrees: f32,
    /// Horizontal shear (x gains `shear_x * y`)
    pub shear_x: f32,
    /// Vertical shear (y gains `shear_y * x`)
    pub shear_y: f32,
}

impl GeometrySample {
    /// Draw a rotation angle and one shear coefficient per axis.
    pub fn draw<R: Rng>(rng: &mut R) -> Self {
        let degrees = rng.gen_range(-MAX_ROTATION_DEGREES..=MAX_ROTATION_DEGREES);
        let shear_x = rng.gen_range(SHEAR_RANGE);
        let shear_y = rng.gen_range(SHEAR_RANGE);
        Self {
            degrees,
            shear_x,
            shear_y,
        }
    }
}

/// Trim `floor(p * w)` columns from both sides and `floor(p * h)` rows from top and bottom.
///
/// Callers are expected to have run [`VariantConfig::check_geometry`]; a crop
/// that would empty the image is clamped to keep at least one pixel.
pub fn crop(image: &RgbImage, config: &VariantConfig) -> RgbImage {
    let (width, height) = image.dimensions();
    let (dx, dy) = config.crop_margins(width, height);
    if dx == 0 && dy == 0 {
        return image.clone();
    }
    let dx = dx.min(width.saturating_sub(1) / 2);
    let dy = dy.min(height.saturating_sub(1) / 2);
    imageops::crop_imm(image, dx, dy, width - 2 * dx, height - 2 * dy).to_image()
}

/// Canvas size that bounds a `width`x`height` rectangle rotated by `degrees`.
///
/// Never smaller than the input, so rotation cannot clip content or shrink the
/// output below the crop-and-border prediction.
pub fn rotated_bounds(width: u32, height: u32, degrees: f32) -> (u32, u32) {
    let (sin, cos) = f64::from(degrees).to_radians().sin_cos();
    let (sin, cos) = (sin.abs(), cos.abs());
    let (w, h) = (f64::from(width), f64::from(height));
    // Shave float noise so an exact fit does not round up a whole pixel.
    let out_w = (w * cos + h * sin - 1e-6).ceil() as u32;
    let out_h = (w * sin + h * cos - 1e-6).ceil() as u32;
    (out_w.max(width), out_h.max(height))
}

/// Rotate counter-clockwise about the center, growing the canvas to fit.
pub fn rotate(image: &RgbImage, degrees: f32) -> RgbImage {
    let (width, height) = image.dimensions();
    let (out_w, out_h) = rotated_bounds(width, height, degrees);
    let (sin, cos) = degrees.to_radians().sin_cos();

    let (cx, cy) = ((width as f32 - 1.0) / 2.0, (height as f32 - 1.0) / 2.0);
    let (ox, oy) = ((out_w as f32 - 1.0) / 2.0, (out_h as f32 - 1.0) / 2.0);

    let padded = pad_edges(image);
    let pad = RESAMPLE_PAD as f32;
    let mut out = RgbImage::new(out_w, out_h);
    warp_into_with(
        &padded,
        move |x, y| {
            let (dx, dy) = (x - ox, y - oy);
            (
                cos * dx - sin * dy + cx + pad,
                sin * dx + cos * dy + cy + pad,
            )
        },
        Interpolation::Bicubic,
        BACKGROUND,
        &mut out,
    );
    out
}

/// Apply the affine shear `(1, sx, 0, sy, 1, 0)`, same canvas size.
///
/// Coefficients map output to input coordinates: the pixel at `(x, y)` is
/// sampled from `(x + sx * y, sy * x + y)`.
pub fn shear(image: &RgbImage, shear_x: f32, shear_y: f32) -> RgbImage {
    let (width, height) = image.dimensions();
    let padded = pad_edges(image);
    let pad = RESAMPLE_PAD as f32;
    let sheared = warp_with(
        &padded,
        move |x, y| {
            let (x, y) = (x - pad, y - pad);
            (x + shear_x * y + pad, shear_y * x + y + pad)
        },
        Interpolation::Bicubic,
        BACKGROUND,
    );
    imageops::crop_imm(&sheared, RESAMPLE_PAD, RESAMPLE_PAD, width, height).to_image()
}

/// Replicate edge pixels outward so bicubic sampling reaches the true border.
///
/// The resampler treats any neighbourhood that leaves the canvas as
/// background, which would otherwise darken a two-pixel frame.
fn pad_edges(image: &RgbImage) -> RgbImage {
    let (width, height) = image.dimensions();
    let max_x = width.saturating_sub(1);
    let max_y = height.saturating_sub(1);
    RgbImage::from_fn(
        width + 2 * RESAMPLE_PAD,
        height + 2 * RESAMPLE_PAD,
        |x, y| {
            let sx = x.saturating_sub(RESAMPLE_PAD).min(max_x);
            let sy = y.saturating_sub(RESAMPLE_PAD).min(max_y);
            *image.get_pixel(sx, sy)
        },
    )
}

/// Worst-case pixel count of the working canvas for one variant.
///
/// Accounts for crop, maximum rotation growth and border padding. Shear keeps
/// the canvas size, so it does not contribute.
pub fn worst_case_pixels(width: u32, height: u32, config: &VariantConfig) -> u64 {
    let (dx, dy) = config.crop_margins(width, height);
    let cropped_w = width.saturating_sub(2 * dx).max(1);
    let cropped_h = height.saturating_sub(2 * dy).max(1);
    let (rot_w, rot_h) = rotated_bounds(cropped_w, cropped_h, MAX_ROTATION_DEGREES);
    let border = u64::from(config.border) * 2;
    (u64::from(rot_w) + border) * (u64::from(rot_h) + border)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        })
    }

    #[test]
    fn test_crop_identity_at_zero() {
        let img = gradient(40, 30);
        let config = VariantConfig {
            crop: 0.0,
            ..VariantConfig::default()
        };
        assert_eq!(crop(&img, &config), img);
    }

    #[test]
    fn test_crop_is_symmetric() {
        let img = gradient(800, 600);
        let config = VariantConfig {
            crop: 0.02,
            ..VariantConfig::default()
        };
        let out = crop(&img, &config);
        assert_eq!(out.dimensions(), (768, 576));
        assert_eq!(out.get_pixel(0, 0), img.get_pixel(16, 12));
    }

    #[test]
    fn test_crop_upper_bound_on_tiny_image_keeps_pixels() {
        let img = gradient(3, 3);
        let config = VariantConfig {
            crop: 0.20,
            ..VariantConfig::default()
        };
        let out = crop(&img, &config);
        assert!(out.width() > 0 && out.height() > 0);
    }

    #[test]
    fn test_rotated_bounds_identity_at_zero() {
        assert_eq!(rotated_bounds(800, 600, 0.0), (800, 600));
    }

    #[test]
    fn test_rotated_bounds_grow_symmetrically() {
        let pos = rotated_bounds(796, 592, 1.2);
        let neg = rotated_bounds(796, 592, -1.2);
        assert_eq!(pos, neg);
        assert!(pos.0 > 796 && pos.1 > 592);
    }

    #[test]
    fn test_rotated_bounds_never_shrink_thin_images() {
        let (w, h) = rotated_bounds(10_000, 1, 1.2);
        assert!(w >= 10_000 && h >= 1);
    }

    #[test]
    fn test_rotate_expands_canvas() {
        let img = gradient(200, 100);
        let out = rotate(&img, 1.0);
        assert_eq!(out.dimensions(), rotated_bounds(200, 100, 1.0));
        assert!(out.width() > 200);
    }

    #[test]
    fn test_rotate_zero_preserves_center() {
        let img = gradient(50, 50);
        let out = rotate(&img, 0.0);
        assert_eq!(out.dimensions(), (50, 50));
        assert_eq!(out.get_pixel(25, 25), img.get_pixel(25, 25));
    }

    #[test]
    fn test_shear_keeps_size_and_exposes_background() {
        let img = RgbImage::from_pixel(500, 500, Rgb([200, 200, 200]));
        let out = shear(&img, 0.007, 0.007);
        assert_eq!(out.dimensions(), (500, 500));
        // (499, 499) samples about 3.5px past the source, beyond the edge padding.
        assert_eq!(*out.get_pixel(499, 499), BACKGROUND);
        assert_eq!(*out.get_pixel(250, 0), Rgb([200, 200, 200]));
        assert_eq!(*out.get_pixel(0, 0), Rgb([200, 200, 200]));
    }

    #[test]
    fn test_sample_within_bounds() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..1000 {
            let sample = GeometrySample::draw(&mut rng);
            assert!(sample.degrees.abs() <= MAX_ROTATION_DEGREES);
            assert!(SHEAR_RANGE.contains(&sample.shear_x));
            assert!(SHEAR_RANGE.contains(&sample.shear_y));
        }
    }

    #[test]
    fn test_worst_case_pixels_accounts_for_border() {
        let config = VariantConfig {
            crop: 0.0,
            border: 10,
            ..VariantConfig::default()
        };
        let (w, h) = rotated_bounds(100, 100, MAX_ROTATION_DEGREES);
        assert_eq!(
            worst_case_pixels(100, 100, &config),
            u64::from(w + 20) * u64::from(h + 20)
        );
    }
}

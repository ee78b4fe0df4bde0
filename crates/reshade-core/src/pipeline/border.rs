//! Border compositor: pads the canvas with a solid black frame.

use image::{imageops, Rgb, RgbImage};

/// Frame color.
pub const BORDER_COLOR: Rgb<u8> = Rgb([0, 0, 0]);

/// Paste `image` at `(width, width)` on a black canvas grown by `width` on every side.
///
/// A zero width returns the image unchanged.
pub fn add_border(image: RgbImage, width: u32) -> RgbImage {
    if width == 0 {
        return image;
    }
    let mut canvas = RgbImage::from_pixel(
        image.width() + 2 * width,
        image.height() + 2 * width,
        BORDER_COLOR,
    );
    imageops::replace(&mut canvas, &image, i64::from(width), i64::from(width));
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_border_is_identity() {
        let img = RgbImage::from_pixel(5, 4, Rgb([9, 9, 9]));
        assert_eq!(add_border(img.clone(), 0), img);
    }

    #[test]
    fn test_border_grows_canvas_and_frames_content() {
        let img = RgbImage::from_pixel(10, 6, Rgb([200, 100, 50]));
        let out = add_border(img, 3);
        assert_eq!(out.dimensions(), (16, 12));
        assert_eq!(*out.get_pixel(0, 0), BORDER_COLOR);
        assert_eq!(*out.get_pixel(2, 5), BORDER_COLOR);
        assert_eq!(*out.get_pixel(3, 3), Rgb([200, 100, 50]));
        assert_eq!(*out.get_pixel(12, 8), Rgb([200, 100, 50]));
        assert_eq!(*out.get_pixel(13, 8), BORDER_COLOR);
    }
}

//! Image compositing.
//!
//! [Compositing and Blending Level 1 § 9.1.4 Source Over](https://www.w3.org/TR/compositing-1/#porterduffcompositingoperators_srcover)
//!
//! All blending onto the canvas goes through this module: decoded images,
//! background fills, borders and glyph coverage.

use std::borrow::Cow;

use image::{Rgba, RgbaImage, imageops};
use wombat_common::image::LoadedImage;
use wombat_css::{Color, Rect};

/// The image at `width` x `height`, resizing only when the size differs.
#[must_use]
pub fn fit(image: &LoadedImage, width: u32, height: u32) -> Cow<'_, LoadedImage> {
    if image.width() == width && image.height() == height {
        Cow::Borrowed(image)
    } else {
        Cow::Owned(image.resized(width, height))
    }
}

/// Blend `image` onto `canvas` with its top-left corner at `(x, y)`.
/// Parts outside the canvas are clipped.
pub fn composite(canvas: &mut RgbaImage, image: &LoadedImage, x: i32, y: i32) {
    imageops::overlay(canvas, image.pixels(), i64::from(x), i64::from(y));
}

/// Source-over blend of `color` at `coverage` (0-255) onto one pixel.
pub fn blend_pixel(canvas: &mut RgbaImage, x: i32, y: i32, color: Color, coverage: u8) {
    let (Ok(px), Ok(py)) = (u32::try_from(x), u32::try_from(y)) else {
        return;
    };
    if px >= canvas.width() || py >= canvas.height() {
        return;
    }
    let alpha = u16::from(color.a) * u16::from(coverage) / 255;
    if alpha == 0 {
        return;
    }
    let pixel = canvas.get_pixel_mut(px, py);
    *pixel = source_over(*pixel, color, alpha as u8);
}

/// Fill `rect` (inclusive corners) with `color`, clipped to the canvas.
pub fn fill_rect(canvas: &mut RgbaImage, rect: Rect, color: Color) {
    let max_x = i32::try_from(canvas.width()).unwrap_or(i32::MAX) - 1;
    let max_y = i32::try_from(canvas.height()).unwrap_or(i32::MAX) - 1;
    for y in rect.y1.max(0)..=rect.y2.min(max_y) {
        for x in rect.x1.max(0)..=rect.x2.min(max_x) {
            blend_pixel(canvas, x, y, color, 255);
        }
    }
}

/// Convert a style color to a pixel.
#[must_use]
pub const fn to_rgba(color: Color) -> Rgba<u8> {
    Rgba([color.r, color.g, color.b, color.a])
}

/// Source-over with straight alpha.
fn source_over(bg: Rgba<u8>, fg: Color, alpha: u8) -> Rgba<u8> {
    let a = f32::from(alpha) / 255.0;
    let inv_a = 1.0 - a;
    let out_a = a + f32::from(bg[3]) / 255.0 * inv_a;
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let bg_a = f32::from(bg[3]) / 255.0 * inv_a;
    let channel = |f: u8, b: u8| {
        (f32::from(f).mul_add(a, f32::from(b) * bg_a) / out_a).round() as u8
    };
    Rgba([
        channel(fg.r, bg[0]),
        channel(fg.g, bg[1]),
        channel(fg.b, bg[2]),
        (out_a * 255.0).round() as u8,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opaque_fill_replaces() {
        let mut canvas = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
        fill_rect(&mut canvas, Rect::new(1, 1, 2, 2), Color::rgb(10, 20, 30));
        assert_eq!(canvas.get_pixel(1, 1).0, [10, 20, 30, 255]);
        assert_eq!(canvas.get_pixel(2, 2).0, [10, 20, 30, 255]);
        assert_eq!(canvas.get_pixel(3, 3).0, [255, 255, 255, 255]);
        assert_eq!(canvas.get_pixel(0, 0).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_fill_is_clipped() {
        let mut canvas = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));
        fill_rect(&mut canvas, Rect::new(-5, -5, 10, 10), Color::WHITE);
        assert!(canvas.pixels().all(|p| p.0 == [255, 255, 255, 255]));
    }

    #[test]
    fn test_half_coverage_blends() {
        let mut canvas = RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 255]));
        blend_pixel(&mut canvas, 0, 0, Color::BLACK, 128);
        let p = canvas.get_pixel(0, 0).0;
        assert_eq!(p[3], 255);
        assert!((126..=128).contains(&p[0]), "{p:?}");
    }

    #[test]
    fn test_transparent_is_noop() {
        let mut canvas = RgbaImage::from_pixel(1, 1, Rgba([1, 2, 3, 255]));
        blend_pixel(&mut canvas, 0, 0, Color::from_named("transparent").unwrap(), 255);
        assert_eq!(canvas.get_pixel(0, 0).0, [1, 2, 3, 255]);
    }

    #[test]
    fn test_composite_places_image() {
        let mut canvas = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
        let image = LoadedImage::new("png", RgbaImage::from_pixel(2, 2, Rgba([0, 0, 255, 255])));
        composite(&mut canvas, &image, 2, 2);
        assert_eq!(canvas.get_pixel(3, 3).0, [0, 0, 255, 255]);
        assert_eq!(canvas.get_pixel(1, 1).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_fit_borrows_when_size_matches() {
        let image = LoadedImage::new("png", RgbaImage::new(3, 3));
        assert!(matches!(fit(&image, 3, 3), Cow::Borrowed(_)));
        assert_eq!(fit(&image, 6, 6).width(), 6);
    }
}

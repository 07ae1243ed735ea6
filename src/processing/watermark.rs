//! # Image Watermarks
//!
//! Blends a secondary image onto the center of a source image at low opacity.
//!
//! The watermark's own luminance becomes its alpha mask, capped at
//! [`MAX_MASK_ALPHA`], so dark parts of the mark disappear and bright parts
//! never exceed roughly 20% opacity.

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, Luma, RgbaImage};

/// Upper bound for any value in the watermark's alpha mask (out of 255).
pub const MAX_MASK_ALPHA: u8 = 50;

/// Blend `mark` onto the center of `image`.
///
/// The mark is shrunk first when it does not fit (see [`fit_mark`]). Neither
/// input is modified.
pub fn watermark(image: &DynamicImage, mark: &DynamicImage) -> RgbaImage {
    let mut target = image.to_rgba8();
    let (image_width, image_height) = target.dimensions();

    // Shrink the mark and derive its mask
    let mut layer = fit_mark(mark.to_rgba8(), image_width, image_height);
    let mask = luminance_mask(&layer);

    // The mask doubles as the layer's own alpha
    for (pixel, alpha) in layer.pixels_mut().zip(mask.pixels()) {
        pixel[3] = alpha[0];
    }

    // Center, rounding toward the top-left
    let x = (image_width as i64 - layer.width() as i64).div_euclid(2);
    let y = (image_height as i64 - layer.height() as i64).div_euclid(2);
    paste_masked(&mut target, &layer, &mask, x, y);

    target
}

/// Shrink the mark so it fits inside the image, preserving its aspect ratio.
///
/// Width and height are checked in two separate passes: when the mark is
/// too wide it is resized to the image width, and then the result of that
/// resize is checked against the image height and resized again if needed.
pub fn fit_mark(mark: RgbaImage, image_width: u32, image_height: u32) -> RgbaImage {
    let mut mark = mark;

    // Pass 1: too wide
    let (mark_width, mark_height) = mark.dimensions();
    if mark_width > image_width {
        let new_height = scale_dimension(mark_height, image_width, mark_width);
        mark = imageops::resize(&mark, image_width, new_height, FilterType::Lanczos3);
    }

    // Pass 2: too tall, checked on the output of pass 1
    let (mark_width, mark_height) = mark.dimensions();
    if mark_height > image_height {
        let new_width = scale_dimension(mark_width, image_height, mark_height);
        mark = imageops::resize(&mark, new_width, image_height, FilterType::Lanczos3);
    }

    mark
}

/// Luminance of every mark pixel, clamped to [`MAX_MASK_ALPHA`].
///
/// Uses the ITU-R 601-2 weights in 16-bit fixed point; alpha is ignored.
pub fn luminance_mask(mark: &RgbaImage) -> GrayImage {
    GrayImage::from_fn(mark.width(), mark.height(), |x, y| {
        let p = mark.get_pixel(x, y);
        let luma = (p[0] as u32 * 19595 + p[1] as u32 * 38470 + p[2] as u32 * 7471 + 0x8000) >> 16;
        Luma([(luma as u8).min(MAX_MASK_ALPHA)])
    })
}

/// `value * numerator / denominator`, rounded, never below one pixel.
fn scale_dimension(value: u32, numerator: u32, denominator: u32) -> u32 {
    let scaled = value as f64 * numerator as f64 / denominator as f64;
    (scaled.round() as u32).max(1)
}

/// Paste `layer` at (`x`, `y`) through `mask`.
///
/// Every channel, alpha included, moves from the destination value towards
/// the layer value by `mask / 255`. Pixels outside the target are clipped.
fn paste_masked(target: &mut RgbaImage, layer: &RgbaImage, mask: &GrayImage, x: i64, y: i64) {
    let x_start = x.max(0);
    let y_start = y.max(0);
    let x_end = (x + layer.width() as i64).min(target.width() as i64);
    let y_end = (y + layer.height() as i64).min(target.height() as i64);

    for ty in y_start..y_end {
        for tx in x_start..x_end {
            let lx = (tx - x) as u32;
            let ly = (ty - y) as u32;

            let m = mask.get_pixel(lx, ly)[0];
            if m == 0 {
                continue;
            }

            let src = layer.get_pixel(lx, ly);
            let dst = target.get_pixel_mut(tx as u32, ty as u32);
            for channel in 0..4 {
                dst[channel] = blend_channel(dst[channel], src[channel], m);
            }
        }
    }
}

/// `dst + (src - dst) * m / 255` with rounding.
fn blend_channel(dst: u8, src: u8, m: u8) -> u8 {
    let tmp = dst as u32 * (255 - m as u32) + src as u32 * m as u32 + 128;
    ((tmp + (tmp >> 8)) >> 8) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba};

    fn solid_rgb(width: u32, height: u32, value: u8) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([value; 3])))
    }

    #[test]
    fn test_mask_never_exceeds_cap() {
        let mark = RgbaImage::from_fn(64, 64, |x, y| {
            Rgba([(x * 4) as u8, (y * 4) as u8, ((x + y) * 2) as u8, 255])
        });

        let mask = luminance_mask(&mark);
        assert!(mask.pixels().all(|p| p[0] <= MAX_MASK_ALPHA));
        assert_eq!(mask.get_pixel(63, 63)[0], MAX_MASK_ALPHA);
        assert_eq!(mask.get_pixel(0, 0)[0], 0);
    }

    #[test]
    fn test_mask_uses_601_weights() {
        let mark = RgbaImage::from_fn(3, 1, |x, _| match x {
            0 => Rgba([100, 0, 0, 255]),
            1 => Rgba([0, 60, 0, 0]),
            _ => Rgba([0, 0, 200, 255]),
        });

        let mask = luminance_mask(&mark);
        assert_eq!(mask.get_pixel(0, 0)[0], 30);
        assert_eq!(mask.get_pixel(1, 0)[0], 35);
        assert_eq!(mask.get_pixel(2, 0)[0], 23);
    }

    #[test]
    fn test_blend_channel_endpoints() {
        assert_eq!(blend_channel(0, 255, 255), 255);
        assert_eq!(blend_channel(200, 0, 0), 200);
        assert_eq!(blend_channel(255, 0, 0), 255);
        assert_eq!(blend_channel(0, 255, 50), 50);
    }

    #[test]
    fn test_white_mark_is_centered_and_capped() {
        let image = solid_rgb(30, 20, 0);
        let mark = solid_rgb(10, 10, 255);

        let result = watermark(&image, &mark);
        assert_eq!(result.dimensions(), (30, 20));

        // mark occupies x 10..20, y 5..15
        assert_eq!(*result.get_pixel(9, 5), Rgba([0, 0, 0, 255]));
        assert_eq!(*result.get_pixel(20, 14), Rgba([0, 0, 0, 255]));
        assert_eq!(*result.get_pixel(10, 4), Rgba([0, 0, 0, 255]));

        let inside = result.get_pixel(10, 5);
        assert_eq!(inside[0], 50);
        assert_eq!(*inside, *result.get_pixel(19, 14));
    }

    #[test]
    fn test_masked_paste_blends_alpha_channel() {
        let image = solid_rgb(4, 4, 0);
        let mark = solid_rgb(4, 4, 255);

        let result = watermark(&image, &mark);
        assert_eq!(*result.get_pixel(0, 0), Rgba([50, 50, 50, 215]));
    }

    #[test]
    fn test_black_mark_leaves_image_untouched() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_fn(12, 12, |x, y| {
            Rgb([(x * 20) as u8, (y * 20) as u8, 77])
        }));
        let mark = solid_rgb(6, 6, 0);

        let result = watermark(&image, &mark);
        assert_eq!(result, image.to_rgba8());
    }

    #[test]
    fn test_wide_mark_is_scaled_to_width() {
        let mark = RgbaImage::new(200, 50);
        let fitted = fit_mark(mark, 100, 100);
        assert_eq!(fitted.dimensions(), (100, 25));
    }

    #[test]
    fn test_tall_mark_is_scaled_to_height() {
        let mark = RgbaImage::new(40, 200);
        let fitted = fit_mark(mark, 100, 100);
        assert_eq!(fitted.dimensions(), (20, 100));
    }

    #[test]
    fn test_wide_and_tall_mark_is_resized_twice() {
        // 200x100 -> 100x50 (width pass) -> 60x30 (height pass)
        let mark = RgbaImage::new(200, 100);
        let fitted = fit_mark(mark, 100, 30);
        assert_eq!(fitted.dimensions(), (60, 30));
    }

    #[test]
    fn test_small_mark_is_not_resized() {
        let mark = RgbaImage::new(10, 5);
        let fitted = fit_mark(mark, 100, 100);
        assert_eq!(fitted.dimensions(), (10, 5));
    }

    #[test]
    fn test_oversized_mark_still_fits_after_watermark() {
        let image = solid_rgb(50, 40, 10);
        let mark = solid_rgb(500, 120, 255);

        let result = watermark(&image, &mark);
        assert_eq!(result.dimensions(), (50, 40));
        assert!(result.pixels().all(|p| p[0] <= 10 + MAX_MASK_ALPHA));
    }
}

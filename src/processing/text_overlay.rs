//! # Text Overlay
//!
//! Draws a single line of translucent white text centered on an image.
//!
//! The text is rendered onto a fully transparent layer the size of the image
//! and that layer is then alpha-composited over an RGBA copy of the source.

use ab_glyph::{point, Font, FontVec, GlyphId, PxScale, ScaleFont};
use image::{DynamicImage, Rgba, RgbaImage};
use std::fmt;
use std::path::Path;

use crate::error::{ImagingError, Result};

/// Fill used for overlay text: white at 50% opacity.
pub const TEXT_FILL: Rgba<u8> = Rgba([255, 255, 255, 128]);

/// A loaded TrueType/OpenType font at a fixed pixel size.
pub struct OverlayFont {
    font: FontVec,
    scale: PxScale,
}

impl fmt::Debug for OverlayFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayFont")
            .field("scale", &self.scale.y)
            .finish()
    }
}

impl OverlayFont {
    /// Parse font data.
    ///
    /// # Errors
    /// - [`ImagingError::Render`] if the data is not a usable font
    pub fn from_bytes(data: Vec<u8>, size: f32) -> Result<Self> {
        let font = FontVec::try_from_vec(data)
            .map_err(|e| ImagingError::Render(format!("invalid font data: {}", e)))?;

        Ok(Self {
            font,
            scale: PxScale::from(size),
        })
    }

    /// Read and parse a font file.
    ///
    /// # Errors
    /// - [`ImagingError::Render`] if the file cannot be read or parsed
    pub fn load(path: &Path, size: f32) -> Result<Self> {
        let data = std::fs::read(path)
            .map_err(|e| ImagingError::Render(format!("{}: {}", path.display(), e)))?;
        Self::from_bytes(data, size)
    }

    /// Width and height of `text` when rendered with this font.
    ///
    /// Width is the sum of advances plus kerning, height is ascent minus
    /// descent.
    pub fn measure(&self, text: &str) -> (f32, f32) {
        let scaled_font = self.font.as_scaled(self.scale);

        let mut width = 0.0f32;
        let mut prev_glyph: Option<GlyphId> = None;

        for c in text.chars() {
            let glyph_id = scaled_font.glyph_id(c);
            if let Some(prev) = prev_glyph {
                width += scaled_font.kern(prev, glyph_id);
            }
            width += scaled_font.h_advance(glyph_id);
            prev_glyph = Some(glyph_id);
        }

        (width, scaled_font.ascent() - scaled_font.descent())
    }
}

/// Draw `text` centered on a copy of `image`.
pub fn overlay(image: &DynamicImage, font: &OverlayFont, text: &str) -> RgbaImage {
    let mut target = image.to_rgba8();
    let (width, height) = target.dimensions();

    let (text_width, text_height) = font.measure(text);
    let origin = text_origin(width, height, text_width, text_height);

    let layer = render_layer(width, height, font, origin, text);
    alpha_composite(&mut target, &layer);

    target
}

/// Top-left corner that centers a `text_width` x `text_height` box.
pub fn text_origin(width: u32, height: u32, text_width: f32, text_height: f32) -> (f32, f32) {
    (
        width as f32 / 2.0 - text_width / 2.0,
        height as f32 / 2.0 - text_height / 2.0,
    )
}

/// Render `text` with [`TEXT_FILL`] onto a transparent layer.
fn render_layer(
    width: u32,
    height: u32,
    font: &OverlayFont,
    origin: (f32, f32),
    text: &str,
) -> RgbaImage {
    let mut layer = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 0]));
    let scaled_font = font.font.as_scaled(font.scale);

    let baseline_y = origin.1 + scaled_font.ascent();
    let mut cursor_x = origin.0;
    let mut prev_glyph: Option<GlyphId> = None;

    for c in text.chars() {
        let glyph_id = scaled_font.glyph_id(c);
        if let Some(prev) = prev_glyph {
            cursor_x += scaled_font.kern(prev, glyph_id);
        }

        let glyph = glyph_id.with_scale_and_position(font.scale, point(cursor_x, baseline_y));
        if let Some(outlined) = font.font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();

            outlined.draw(|px, py, coverage| {
                let x = px as i32 + bounds.min.x as i32;
                let y = py as i32 + bounds.min.y as i32;

                if x >= 0 && y >= 0 && x < width as i32 && y < height as i32 {
                    let pixel = layer.get_pixel_mut(x as u32, y as u32);
                    let alpha = pixel[3] as f32;
                    let fill_alpha = TEXT_FILL[3] as f32;
                    let coverage = coverage.clamp(0.0, 1.0);
                    *pixel = Rgba([
                        TEXT_FILL[0],
                        TEXT_FILL[1],
                        TEXT_FILL[2],
                        (alpha + (fill_alpha - alpha) * coverage).round() as u8,
                    ]);
                }
            });
        }

        cursor_x += scaled_font.h_advance(glyph_id);
        prev_glyph = Some(glyph_id);
    }

    layer
}

/// Composite `src` over `dst` in place (Porter-Duff "over").
///
/// Both images must have the same dimensions.
pub fn alpha_composite(dst: &mut RgbaImage, src: &RgbaImage) {
    for (bottom, top) in dst.pixels_mut().zip(src.pixels()) {
        *bottom = over(*bottom, *top);
    }
}

fn over(bottom: Rgba<u8>, top: Rgba<u8>) -> Rgba<u8> {
    if top[3] == 0 {
        return bottom;
    }

    let top_alpha = top[3] as f32 / 255.0;
    let bottom_alpha = bottom[3] as f32 / 255.0;
    let out_alpha = top_alpha + bottom_alpha * (1.0 - top_alpha);

    let blend = |t: u8, b: u8| -> u8 {
        let result =
            (t as f32 * top_alpha + b as f32 * bottom_alpha * (1.0 - top_alpha)) / out_alpha;
        result.round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        blend(top[0], bottom[0]),
        blend(top[1], bottom[1]),
        blend(top[2], bottom[2]),
        (out_alpha * 255.0).round() as u8,
    ])
}

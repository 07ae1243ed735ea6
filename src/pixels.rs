//! # Pixel Buffers
//!
//! Thin layer over the `image` crate: decode uploaded bytes into a
//! [`DynamicImage`] while remembering the container format, and encode buffers
//! back to PNG or JPEG bytes.
//!
//! Results of the transforms are always written as PNG. The steganography
//! result in particular must never be re-encoded lossily, since JPEG
//! compression destroys the low bits the payload lives in.

use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

use crate::error::{ImagingError, Result};

/// A decoded image plus the format it was uploaded in, when recognised.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub image: DynamicImage,
    pub format: Option<ImageFormat>,
}

/// Decode raw image bytes of any format supported by the `image` crate.
///
/// # Errors
/// - [`ImagingError::DecodeImage`] if the bytes are not a decodable image
pub fn decode(bytes: &[u8]) -> Result<DecodedImage> {
    let format = image::guess_format(bytes).ok();
    let image = image::load_from_memory(bytes)
        .map_err(|e| ImagingError::DecodeImage(e.to_string()))?;

    Ok(DecodedImage { image, format })
}

/// Encode an image as PNG bytes.
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    encode(image, ImageFormat::Png)
}

/// Encode an image in the given format.
///
/// Only PNG and JPEG are produced; any other format falls back to PNG. JPEG has
/// no alpha channel, so the image is flattened to RGB first.
pub fn encode(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
    let mut output_bytes = Vec::new();

    match format {
        ImageFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
            rgb.write_to(&mut Cursor::new(&mut output_bytes), ImageFormat::Jpeg)
        }
        _ => image.write_to(&mut Cursor::new(&mut output_bytes), ImageFormat::Png),
    }
    .map_err(|e| ImagingError::EncodeImage(e.to_string()))?;

    Ok(output_bytes)
}

/// Re-encode a decoded upload in the format it arrived in (PNG when unknown).
pub fn encode_source(decoded: &DecodedImage) -> Result<Vec<u8>> {
    encode(&decoded.image, decoded.format.unwrap_or(ImageFormat::Png))
}

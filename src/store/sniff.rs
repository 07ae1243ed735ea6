//! Content-type sniffing from magic bytes.

use image::ImageFormat;

/// How many leading bytes are inspected.
pub const SNIFF_LEN: usize = 512;

/// Fallback for content that is not a recognised image.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Infer a MIME type from the first [`SNIFF_LEN`] bytes of `bytes`.
pub fn sniff_mime(bytes: &[u8]) -> &'static str {
    let head = &bytes[..bytes.len().min(SNIFF_LEN)];

    match image::guess_format(head) {
        Ok(format) => mime_for(format),
        Err(_) => OCTET_STREAM,
    }
}

fn mime_for(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Png => "image/png",
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Gif => "image/gif",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Bmp => "image/bmp",
        ImageFormat::Tiff => "image/tiff",
        ImageFormat::Ico => "image/x-icon",
        ImageFormat::Avif => "image/avif",
        _ => OCTET_STREAM,
    }
}

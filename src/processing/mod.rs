//! # Image Transforms
//!
//! The three pixel-level transforms offered by the service:
//!
//! - [`text_overlay`]: centered translucent text
//! - [`watermark`]: low-opacity image watermark
//! - [`steganography`]: payload hidden in red-channel LSBs
//!
//! All of them are synchronous and never modify their input buffers.

pub mod steganography;
pub mod text_overlay;
pub mod watermark;

pub use text_overlay::{overlay, OverlayFont};
pub use watermark::watermark;

//! # Error Types
//!
//! Typed failures for the image transforms and the artifact store. Binaries and
//! configuration loading wrap these in `anyhow`; the HTTP layer maps each kind
//! to a status code.

use thiserror::Error;

/// Errors produced by decoding, transforming, encoding or storing images.
#[derive(Debug, Error)]
pub enum ImagingError {
    /// The uploaded bytes are not a decodable image.
    #[error("failed to decode image: {0}")]
    DecodeImage(String),

    /// A transformed image could not be encoded to bytes.
    #[error("failed to encode image: {0}")]
    EncodeImage(String),

    /// The serialized payload needs more bit slots than the image has pixels.
    #[error("payload needs {required} bits but image only has {available} pixels")]
    Capacity { required: usize, available: usize },

    /// No valid hidden payload could be read back from the image.
    #[error("no hidden payload found: {0}")]
    Decode(String),

    /// The font resource could not be loaded.
    #[error("failed to load font: {0}")]
    Render(String),

    /// The backing artifact store could not be reached.
    #[error("artifact store unavailable: {0}")]
    StoreUnavailable(String),
}

pub type Result<T> = std::result::Result<T, ImagingError>;

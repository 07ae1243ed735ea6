//! # Image Service - Transform and Stage
//!
//! The core service is responsible for ONE thing: running a transform on an
//! uploaded image and staging the source and result in the artifact store.
//!
//! HTTP concerns (multipart parsing, status codes, blocking-pool hand-off) are
//! handled by the [`routes`](super::routes) layer.

use bytes::Bytes;
use image::DynamicImage;
use log::info;

use crate::common::config::ProcessingConfig;
use crate::common::resources::Resources;
use crate::error::{ImagingError, Result};
use crate::pixels;
use crate::processing::{overlay, steganography, watermark};
use crate::store::{ArtifactStore, OperationId, Role};

/// One of the three transforms, with its request-specific input.
#[derive(Debug, Clone)]
pub enum Transform {
    /// Draw `text` centered on the image.
    TextOverlay { text: String },
    /// Blend `mark` (or the configured default watermark) onto the image.
    Watermark { mark: Option<Vec<u8>> },
    /// Hide `text` in the red-channel LSBs.
    HiddenText { text: String },
}

impl Transform {
    pub fn name(&self) -> &'static str {
        match self {
            Transform::TextOverlay { .. } => "text-overlay",
            Transform::Watermark { .. } => "watermark",
            Transform::HiddenText { .. } => "steganography",
        }
    }
}

/// Runs transforms and stages their inputs and outputs.
pub struct ImageService {
    resources: &'static Resources,
    store: ArtifactStore,
    processing: ProcessingConfig,
}

impl ImageService {
    /// Create a new service.
    ///
    /// # Arguments
    /// - `resources`: Font, default watermark and placeholder, loaded once
    /// - `store`: Where source and result images are staged
    /// - `processing`: Default texts for requests that leave them out
    pub fn new(
        resources: &'static Resources,
        store: ArtifactStore,
        processing: ProcessingConfig,
    ) -> Self {
        Self {
            resources,
            store,
            processing,
        }
    }

    /// Overlay `text` (default: the configured overlay text).
    pub fn text_overlay(&self, image_data: &[u8], text: Option<&str>) -> Result<OperationId> {
        let text = text.unwrap_or(&self.processing.overlay_text).to_string();
        self.process(image_data, Transform::TextOverlay { text })
    }

    /// Watermark with `mark_data` (default: the configured watermark image).
    pub fn watermark(&self, image_data: &[u8], mark_data: Option<&[u8]>) -> Result<OperationId> {
        let mark = mark_data.map(|data| data.to_vec());
        self.process(image_data, Transform::Watermark { mark })
    }

    /// Hide `text` (default: the configured hidden text).
    pub fn steganography(&self, image_data: &[u8], text: Option<&str>) -> Result<OperationId> {
        let text = text.unwrap_or(&self.processing.hidden_text).to_string();
        self.process(image_data, Transform::HiddenText { text })
    }

    /// Decode the upload, run `transform` and stage both images.
    ///
    /// The source is echoed in its uploaded format, the result is always PNG.
    /// Nothing is written to the store unless the transform succeeds.
    ///
    /// # Errors
    /// - [`ImagingError::DecodeImage`] if the upload (or an uploaded
    ///   watermark) is not an image
    /// - [`ImagingError::Capacity`] if hidden text does not fit
    /// - [`ImagingError::StoreUnavailable`] if staging fails
    pub fn process(&self, image_data: &[u8], transform: Transform) -> Result<OperationId> {
        let source = pixels::decode(image_data)?;

        let result = match &transform {
            Transform::TextOverlay { text } => {
                DynamicImage::ImageRgba8(overlay(&source.image, &self.resources.font, text))
            }
            Transform::Watermark { mark } => {
                let uploaded;
                let mark_image = match mark {
                    Some(data) => {
                        uploaded = pixels::decode(data)?.image;
                        &uploaded
                    }
                    None => &self.resources.watermark,
                };
                DynamicImage::ImageRgba8(watermark(&source.image, mark_image))
            }
            Transform::HiddenText { text } => {
                DynamicImage::ImageRgb8(steganography::encode(text.as_str(), &source.image)?)
            }
        };

        let source_bytes = pixels::encode_source(&source)?;
        let result_bytes = pixels::encode_png(&result)?;

        let operation_id = OperationId::generate();
        let (source_len, result_len) = (source_bytes.len(), result_bytes.len());
        self.store.put(&operation_id.key(Role::Source), source_bytes)?;
        self.store.put(&operation_id.key(Role::Result), result_bytes)?;

        info!(
            "🖼️ {} operation {} staged ({}x{}, source {} bytes, result {} bytes)",
            transform.name(),
            operation_id,
            result.width(),
            result.height(),
            source_len,
            result_len
        );

        Ok(operation_id)
    }

    /// Read the hidden text back from a stored steganography result.
    ///
    /// # Errors
    /// - [`ImagingError::Decode`] if no result is stored under this id, or it
    ///   carries no readable payload
    /// - [`ImagingError::StoreUnavailable`] if the store cannot be reached
    pub fn reveal(&self, operation_id: &OperationId) -> Result<String> {
        let key = operation_id.key(Role::Result);
        let stored = self
            .store
            .fetch(&key)?
            .ok_or_else(|| ImagingError::Decode(format!("no result stored for {}", operation_id)))?;

        let image = pixels::decode(&stored)
            .map_err(|e| ImagingError::Decode(e.to_string()))?
            .image;

        steganography::decode(&image)
    }

    /// Bytes and content type for a store key, placeholder on miss.
    pub fn cached_image(&self, key: &str) -> (Bytes, &'static str) {
        self.store.sniff_and_serve(key)
    }
}

//! # Process-wide Resources
//!
//! The overlay font, the default watermark and the placeholder image are read
//! from disk once at startup and kept for the lifetime of the process. A file
//! that cannot be loaded aborts startup instead of degrading later requests.

use anyhow::{Context, Result};
use bytes::Bytes;
use image::DynamicImage;
use log::info;
use std::path::Path;
use std::sync::OnceLock;

use super::config::ResourcesConfig;
use crate::processing::OverlayFont;

static RESOURCES: OnceLock<Resources> = OnceLock::new();

/// Immutable assets shared by every request.
#[derive(Debug)]
pub struct Resources {
    pub font: OverlayFont,
    pub watermark: DynamicImage,
    pub placeholder: Bytes,
}

impl Resources {
    /// Load all resources described by `config`.
    pub fn load(config: &ResourcesConfig) -> Result<Self> {
        let font = OverlayFont::load(&config.font, config.font_size)?;
        let watermark = image::open(&config.watermark_image).with_context(|| {
            format!(
                "Failed to load watermark image {}",
                config.watermark_image.display()
            )
        })?;
        let placeholder = load_placeholder(&config.placeholder_image)?;

        Ok(Self {
            font,
            watermark,
            placeholder,
        })
    }

    /// Load the resources into the process-wide slot, once.
    ///
    /// Later calls return the already loaded resources and ignore `config`.
    pub fn init(config: &ResourcesConfig) -> Result<&'static Resources> {
        if let Some(resources) = RESOURCES.get() {
            return Ok(resources);
        }

        let loaded = Self::load(config)?;
        info!(
            "📦 Loaded resources (watermark {}x{}, placeholder {} bytes)",
            loaded.watermark.width(),
            loaded.watermark.height(),
            loaded.placeholder.len()
        );

        Ok(RESOURCES.get_or_init(|| loaded))
    }
}

/// Read the placeholder image fully into memory.
pub fn load_placeholder(path: &Path) -> Result<Bytes> {
    let data = std::fs::read(path)
        .with_context(|| format!("Failed to read placeholder image {}", path.display()))?;
    Ok(Bytes::from(data))
}

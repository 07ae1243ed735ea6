//! # Configuration Utilities
//!
//! Configuration sections shared by the server and the offline tool, plus the
//! generic TOML loader.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Load a TOML configuration file and deserialize it into the specified type.
///
/// # Arguments
/// - `path`: Path to the TOML configuration file
///
/// # Returns
/// - `Ok(T)`: Successfully loaded and parsed configuration
/// - `Err`: File I/O or parsing error
///
/// # Example
/// ```ignore
/// let config: ServerConfig = load_config("config/server.toml")?;
/// ```
pub fn load_config<T>(path: impl AsRef<Path>) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    let config: T = toml::from_str(&content)?;
    Ok(config)
}

/// Files loaded once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourcesConfig {
    /// Watermark used when a request does not upload its own
    pub watermark_image: PathBuf,
    /// Image served for unknown or expired keys
    pub placeholder_image: PathBuf,
    /// TrueType/OpenType font for text overlays
    pub font: PathBuf,
    /// Font size in pixels
    #[serde(default = "default_font_size")]
    pub font_size: f32,
}

fn default_font_size() -> f32 {
    24.0
}

/// Retention limits of the in-memory artifact store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Seconds an artifact stays retrievable after it was written
    pub ttl_secs: u64,
    /// Upper bound on the total size of stored artifacts
    pub max_capacity_bytes: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 60 * 60,
            max_capacity_bytes: 256 * 1024 * 1024,
        }
    }
}

/// Default texts used when a request leaves them out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Text drawn by the overlay transform
    pub overlay_text: String,
    /// Text hidden by the steganography transform
    pub hidden_text: String,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            overlay_text: "watermark-studio".to_string(),
            hidden_text: "watermark-studio".to_string(),
        }
    }
}

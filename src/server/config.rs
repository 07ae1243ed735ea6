use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::common::config::{load_config, ProcessingConfig, ResourcesConfig, StoreConfig};

/// Complete server configuration loaded from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerInfo,
    pub resources: ResourcesConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub processing: ProcessingConfig,
}

/// Listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerInfo {
    /// Address the HTTP listener binds to (e.g., "127.0.0.1:3000")
    pub address: String,
    /// Largest accepted request body
    pub max_upload_bytes: usize,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:3000".to_string(),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        load_config(path)
    }
}

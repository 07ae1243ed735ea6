//! # Server Binary Entry Point
//!
//! Thin wrapper that loads the configuration and resources, then serves the
//! image API.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin server -- --config config/server.toml
//! ```
//!
//! The server will:
//! 1. Load configuration from the specified TOML file
//! 2. Load the font, default watermark and placeholder (startup fails if any is missing)
//! 3. Create the in-memory artifact store
//! 4. Listen for HTTP requests on the configured address

use anyhow::Context;
use clap::Parser;
use log::info;
use std::sync::Arc;

use watermark_studio::common::logging::init_logger;
use watermark_studio::common::resources::Resources;
use watermark_studio::server::{router, ImageService, ServerConfig};
use watermark_studio::store::{ArtifactStore, MemoryBackend};

/// Command-line arguments for the server binary
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the server configuration file (TOML format)
    #[arg(short, long, default_value = "config/server.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    let args = Args::parse();
    let config = ServerConfig::from_file(&args.config)?;

    let resources = Resources::init(&config.resources)?;

    let backend = MemoryBackend::new(&config.store);
    let store = ArtifactStore::new(Arc::new(backend), resources.placeholder.clone());
    info!(
        "🗄️ Artifact store ready (ttl {}s, capacity {} bytes)",
        config.store.ttl_secs, config.store.max_capacity_bytes
    );

    let service = Arc::new(ImageService::new(
        resources,
        store,
        config.processing.clone(),
    ));
    let app = router(service, config.server.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(&config.server.address)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.address))?;

    info!("🌐 Listening on http://{}", config.server.address);

    axum::serve(listener, app).await?;

    Ok(())
}

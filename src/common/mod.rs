//! # Common Components
//!
//! Shared utilities used by the server and the offline tool.
//!
//! ## Modules
//!
//! - [`config`]: Configuration sections and the TOML loader
//! - [`resources`]: Font, watermark and placeholder loaded once per process
//! - [`logging`]: Logger setup shared by the binaries

pub mod config;
pub mod logging;
pub mod resources;

//! # Server Components
//!
//! - [`server`]: the image service that runs transforms and stages results
//! - [`routes`]: axum handlers exposing the service over HTTP
//! - [`config`]: server configuration file

pub mod config;
pub mod routes;
pub mod server;

pub use config::ServerConfig;
pub use routes::router;
pub use server::{ImageService, Transform};

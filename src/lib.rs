pub mod common;
pub mod error;
pub mod pixels;
pub mod processing;
pub mod server;
pub mod store;

pub use error::{ImagingError, Result};
pub use server::{ImageService, Transform};
pub use store::{ArtifactStore, OperationId};

//! # Ephemeral Artifact Store
//!
//! Holds the encoded source and result images of recent operations so they can
//! be fetched back by key for a limited time.
//!
//! ## Contract
//!
//! - [`ArtifactStore::put`] always overwrites and reports backend failures.
//! - [`ArtifactStore::get`] never fails. A missing key, an expired entry or an
//!   unreachable backend all return the placeholder image instead.
//! - [`ArtifactStore::sniff_and_serve`] pairs the bytes with a MIME type
//!   sniffed from their leading magic bytes.
//!
//! Keys are built by callers with [`OperationId::key`] and are never
//! validated here.

pub mod keys;
pub mod memory;
pub mod sniff;

use bytes::Bytes;
use log::warn;
use std::sync::Arc;

use crate::error::Result;

pub use keys::{InvalidOperationId, OperationId, Role};
pub use memory::MemoryBackend;
pub use sniff::sniff_mime;

/// Storage behind the artifact store.
///
/// The in-process [`MemoryBackend`] is the default; a shared external
/// key/value service can be plugged in for multi-process deployments as long
/// as it keeps read-after-write consistency per key.
pub trait ArtifactBackend: Send + Sync {
    /// Store `bytes` under `key`, replacing any previous value.
    fn put(&self, key: &str, bytes: Bytes) -> Result<()>;

    /// Fetch the value under `key`, `Ok(None)` when absent or expired.
    fn get(&self, key: &str) -> Result<Option<Bytes>>;
}

/// Key/blob store with a placeholder fallback.
#[derive(Clone)]
pub struct ArtifactStore {
    backend: Arc<dyn ArtifactBackend>,
    placeholder: Bytes,
}

impl ArtifactStore {
    pub fn new(backend: Arc<dyn ArtifactBackend>, placeholder: Bytes) -> Self {
        Self {
            backend,
            placeholder,
        }
    }

    /// Store an artifact. Backend failures are propagated.
    pub fn put(&self, key: &str, bytes: impl Into<Bytes>) -> Result<()> {
        self.backend.put(key, bytes.into())
    }

    /// Fetch an artifact, falling back to the placeholder image.
    pub fn get(&self, key: &str) -> Bytes {
        match self.backend.get(key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => self.placeholder.clone(),
            Err(e) => {
                warn!("⚠️ Serving placeholder for '{}': {}", key, e);
                self.placeholder.clone()
            }
        }
    }

    /// Look a key up without the placeholder fallback.
    pub fn fetch(&self, key: &str) -> Result<Option<Bytes>> {
        self.backend.get(key)
    }

    /// Fetch an artifact together with its sniffed content type.
    pub fn sniff_and_serve(&self, key: &str) -> (Bytes, &'static str) {
        let bytes = self.get(key);
        let content_type = sniff_mime(&bytes);
        (bytes, content_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ImagingError;
    use crate::pixels;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use std::time::Duration;

    struct UnreachableBackend;

    impl ArtifactBackend for UnreachableBackend {
        fn put(&self, _key: &str, _bytes: Bytes) -> Result<()> {
            Err(ImagingError::StoreUnavailable("connection refused".to_string()))
        }

        fn get(&self, _key: &str) -> Result<Option<Bytes>> {
            Err(ImagingError::StoreUnavailable("connection refused".to_string()))
        }
    }

    fn jpeg_placeholder() -> Bytes {
        let image = DynamicImage::ImageRgb8(RgbImage::new(4, 4));
        Bytes::from(pixels::encode(&image, ImageFormat::Jpeg).unwrap())
    }

    fn memory_store(placeholder: Bytes) -> ArtifactStore {
        let backend = MemoryBackend::with_limits(Duration::from_secs(60), 1024 * 1024);
        ArtifactStore::new(Arc::new(backend), placeholder)
    }

    #[test]
    fn test_put_and_get_by_operation_keys() {
        let store = memory_store(jpeg_placeholder());
        let id = OperationId::generate();

        store.put(&id.key(Role::Source), b"source bytes".to_vec()).unwrap();
        store.put(&id.key(Role::Result), b"result bytes".to_vec()).unwrap();

        assert_eq!(store.get(&id.key(Role::Result)), Bytes::from_static(b"result bytes"));
        assert_eq!(store.get(&id.key(Role::Source)), Bytes::from_static(b"source bytes"));
    }

    #[test]
    fn test_missing_key_returns_placeholder() {
        let placeholder = jpeg_placeholder();
        let store = memory_store(placeholder.clone());

        let other = OperationId::generate();
        assert_eq!(store.get(&other.key(Role::Result)), placeholder);

        let (bytes, content_type) = store.sniff_and_serve(&other.key(Role::Result));
        assert_eq!(bytes, placeholder);
        assert_eq!(content_type, "image/jpeg");
    }

    #[test]
    fn test_expired_key_returns_placeholder() {
        let placeholder = jpeg_placeholder();
        let backend = MemoryBackend::with_limits(Duration::from_millis(50), 1024 * 1024);
        let store = ArtifactStore::new(Arc::new(backend), placeholder.clone());

        store.put("result-image-x", b"gone soon".to_vec()).unwrap();
        std::thread::sleep(Duration::from_millis(200));

        assert_eq!(store.get("result-image-x"), placeholder);
    }

    #[test]
    fn test_sniffs_stored_png() {
        let store = memory_store(jpeg_placeholder());
        let png = pixels::encode_png(&DynamicImage::ImageRgb8(RgbImage::new(2, 2))).unwrap();
        store.put("result-image-png", png.clone()).unwrap();

        let (bytes, content_type) = store.sniff_and_serve("result-image-png");
        assert_eq!(bytes.as_ref(), png.as_slice());
        assert_eq!(content_type, "image/png");
    }

    #[test]
    fn test_concurrent_writers_do_not_interfere() {
        let store = memory_store(jpeg_placeholder());

        let workers: Vec<_> = (0..8)
            .map(|worker| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for i in 0..500 {
                        let key = format!("result-image-{}-{}", worker, i);
                        let bytes = format!("worker {} item {}", worker, i).into_bytes();

                        store.put(&key, bytes.clone()).unwrap();
                        assert_eq!(store.get(&key).as_ref(), bytes.as_slice());
                    }
                })
            })
            .collect();

        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(
            store.get("result-image-3-499").as_ref(),
            b"worker 3 item 499"
        );
    }

    #[test]
    fn test_unreachable_backend() {
        let placeholder = jpeg_placeholder();
        let store = ArtifactStore::new(Arc::new(UnreachableBackend), placeholder.clone());

        assert!(matches!(
            store.put("result-image-x", b"data".to_vec()),
            Err(ImagingError::StoreUnavailable(_))
        ));
        assert_eq!(store.get("result-image-x"), placeholder);
    }
}

//! In-process artifact backend backed by moka.
//!
//! Entries expire after a fixed time-to-live and the cache is bounded by the
//! total number of stored bytes. Expired or evicted keys simply read as
//! absent.

use bytes::Bytes;
use std::time::Duration;

use super::ArtifactBackend;
use crate::common::config::StoreConfig;
use crate::error::Result;

/// Time- and size-bounded key/blob map.
pub struct MemoryBackend {
    cache: moka::sync::Cache<String, Bytes>,
}

impl MemoryBackend {
    /// Create a backend from the `[store]` configuration section.
    pub fn new(config: &StoreConfig) -> Self {
        Self::with_limits(
            Duration::from_secs(config.ttl_secs),
            config.max_capacity_bytes,
        )
    }

    pub fn with_limits(ttl: Duration, max_capacity_bytes: u64) -> Self {
        let cache = moka::sync::Cache::builder()
            .max_capacity(max_capacity_bytes)
            .time_to_live(ttl)
            .weigher(|key: &String, value: &Bytes| {
                let size = key.len() + value.len();
                if size > u32::MAX as usize {
                    u32::MAX
                } else {
                    size as u32
                }
            })
            .build();

        Self { cache }
    }

    #[cfg(test)]
    fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }
}

impl ArtifactBackend for MemoryBackend {
    fn put(&self, key: &str, bytes: Bytes) -> Result<()> {
        self.cache.insert(key.to_string(), bytes);
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Bytes>> {
        Ok(self.cache.get(key))
    }
}

//! In-process snapshot storage

use super::BlobCache;
use crate::error::BlobError;
use crate::types::{CacheSnapshot, LookupKey};
use async_trait::async_trait;
use moka::future::Cache;
use std::sync::Arc;

const DEFAULT_MAX_ENTRIES: u64 = 1_000;

/// Snapshot storage held in a moka cache.
///
/// Bounded by entry count only; there is no TTL because staleness is judged
/// from `captured_at`.
pub struct MemoryBlobCache {
    snapshots: Cache<String, Arc<CacheSnapshot>>,
}

impl MemoryBlobCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_ENTRIES)
    }

    pub fn with_capacity(max_entries: u64) -> Self {
        Self {
            snapshots: Cache::builder().max_capacity(max_entries).build(),
        }
    }

    pub fn entry_count(&self) -> u64 {
        self.snapshots.entry_count()
    }

    /// Drop the snapshot for a key, as if the object had been deleted externally
    pub async fn remove(&self, key: &LookupKey) {
        self.snapshots.invalidate(key.as_str()).await;
    }
}

impl Default for MemoryBlobCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobCache for MemoryBlobCache {
    async fn get(&self, key: &LookupKey) -> Result<Option<CacheSnapshot>, BlobError> {
        Ok(self
            .snapshots
            .get(key.as_str())
            .await
            .map(|snapshot| snapshot.as_ref().clone()))
    }

    async fn put(&self, key: &LookupKey, snapshot: &CacheSnapshot) -> Result<(), BlobError> {
        self.snapshots
            .insert(key.as_str().to_string(), Arc::new(snapshot.clone()))
            .await;
        Ok(())
    }
}

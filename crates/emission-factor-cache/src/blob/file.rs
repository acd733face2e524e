//! File-based snapshot storage

use super::{encoded_object_name, BlobCache};
use crate::error::BlobError;
use crate::types::{CacheSnapshot, LookupKey};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tracing::{debug, info};

/// Stores each snapshot as `<cache_dir>/<key>.json`
pub struct FileBlobCache {
    /// Directory where snapshots are stored
    cache_dir: PathBuf,
    /// Counter for unique temporary file names
    write_seq: AtomicU64,
}

impl FileBlobCache {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            write_seq: AtomicU64::new(0),
        }
    }

    /// Initialize the cache by ensuring the cache directory exists and
    /// removing temporary files left behind by interrupted writes
    pub async fn init(&self) -> Result<(), BlobError> {
        fs::create_dir_all(&self.cache_dir).await?;

        let mut removed = 0;
        let mut entries = fs::read_dir(&self.cache_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if !(name.starts_with('.') && name.ends_with(".tmp")) {
                continue;
            }
            match fs::remove_file(entry.path()).await {
                Ok(()) => removed += 1,
                Err(e) => debug!(path = ?entry.path(), error = %e, "Failed to remove orphaned temp file"),
            }
        }

        info!(cache_dir = ?self.cache_dir, removed, "Snapshot cache initialized");
        Ok(())
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Path of the snapshot object for a key
    pub fn path_for(&self, key: &LookupKey) -> PathBuf {
        self.cache_dir.join(encoded_object_name(key))
    }

    fn temp_path_for(&self, key: &LookupKey) -> PathBuf {
        let seq = self.write_seq.fetch_add(1, Ordering::Relaxed);
        self.cache_dir.join(format!(
            ".{}.{}.{}.tmp",
            encoded_object_name(key),
            std::process::id(),
            seq
        ))
    }
}

#[async_trait]
impl BlobCache for FileBlobCache {
    async fn get(&self, key: &LookupKey) -> Result<Option<CacheSnapshot>, BlobError> {
        let path = self.path_for(key);
        let data = match fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(key = %key, "Snapshot file not found");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Some(serde_json::from_slice(&data)?))
    }

    async fn put(&self, key: &LookupKey, snapshot: &CacheSnapshot) -> Result<(), BlobError> {
        let data = serde_json::to_vec(snapshot)?;

        // Write aside and rename so readers never observe a partial object
        let temp_path = self.temp_path_for(key);
        if let Err(e) = fs::write(&temp_path, &data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&temp_path, self.path_for(key)).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        debug!(key = %key, size = data.len(), "Wrote snapshot file");
        Ok(())
    }
}

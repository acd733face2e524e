//! Snapshot storage backends

mod file;
mod http;
mod memory;

pub use file::FileBlobCache;
pub use http::HttpBlobCache;
pub use memory::MemoryBlobCache;

use crate::error::BlobError;
use crate::types::{CacheSnapshot, LookupKey};
use async_trait::async_trait;

/// Object store holding one serialized snapshot per key.
///
/// Entries never expire on their own; staleness is decided by the
/// coordinator from the snapshot's `captured_at`.
#[async_trait]
pub trait BlobCache: Send + Sync {
    /// Read the snapshot for `key`, `None` if it was never written or has been removed
    async fn get(&self, key: &LookupKey) -> Result<Option<CacheSnapshot>, BlobError>;

    /// Replace the snapshot for `key` in a single write
    async fn put(&self, key: &LookupKey, snapshot: &CacheSnapshot) -> Result<(), BlobError>;
}

/// Object name made safe for use as a path segment
pub(crate) fn encoded_object_name(key: &LookupKey) -> String {
    urlencoding::encode(&key.object_name()).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoded_object_name() {
        let key = LookupKey::new("Diesel").unwrap();
        assert_eq!(encoded_object_name(&key), "Diesel.json");

        let key = LookupKey::new("Heavy Fuel/Oil").unwrap();
        assert_eq!(encoded_object_name(&key), "Heavy%20Fuel%2FOil.json");
    }

    #[test]
    fn test_encoded_object_name_neutralizes_traversal() {
        let key = LookupKey::new("../etc/passwd").unwrap();
        assert!(!encoded_object_name(&key).contains('/'));
    }
}

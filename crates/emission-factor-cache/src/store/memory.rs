//! In-process emission factor store

use super::AuthoritativeStore;
use crate::error::StoreError;
use crate::types::{LookupKey, Record, RecordSet};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// Store backed by a map, for tests and local runs without a database
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, RecordSet>>,
    queries: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record under a fuel type
    pub async fn insert(&self, fuel_type: &str, record: Record) {
        let mut records = self.records.write().await;
        records
            .entry(fuel_type.to_string())
            .or_default()
            .push(record);
    }

    /// Replace every record stored under a fuel type
    pub async fn replace(&self, fuel_type: &str, set: RecordSet) {
        let mut records = self.records.write().await;
        records.insert(fuel_type.to_string(), set);
    }

    /// Number of queries answered so far
    pub fn query_count(&self) -> u64 {
        self.queries.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl AuthoritativeStore for MemoryStore {
    async fn query(&self, key: &LookupKey) -> Result<RecordSet, StoreError> {
        self.queries.fetch_add(1, Ordering::Relaxed);
        let records = self.records.read().await;
        Ok(records.get(key.as_str()).cloned().unwrap_or_default())
    }
}

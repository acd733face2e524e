//! Authoritative emission-factor stores

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgEmissionFactorStore;

use crate::error::StoreError;
use crate::types::{LookupKey, RecordSet};
use async_trait::async_trait;

/// Source of truth for emission factors, queried by fuel type.
///
/// An empty record set means the key is unknown and is not an error here.
#[async_trait]
pub trait AuthoritativeStore: Send + Sync {
    async fn query(&self, key: &LookupKey) -> Result<RecordSet, StoreError>;
}

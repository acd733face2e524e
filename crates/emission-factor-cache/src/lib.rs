//! Read-through snapshot cache for emission factors
//!
//! Emission factors live in a slow, costly authoritative store (Postgres).
//! Lookups are answered from a blob cache holding one timestamped snapshot
//! per fuel type, and the snapshot is refreshed from the store once it falls
//! outside the configured freshness window.
//!
//! # Example
//!
//! ```no_run
//! use emission_factor_cache::{
//!     CacheCoordinator, FileBlobCache, FreshnessWindow, LookupKey, PgEmissionFactorStore,
//!     TimeUnit,
//! };
//! use std::sync::Arc;
//!
//! # async fn example(pool: sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
//! let blob = FileBlobCache::new("./cache/emission-factors".into());
//! blob.init().await?;
//!
//! let coordinator = CacheCoordinator::new(
//!     Arc::new(blob),
//!     Arc::new(PgEmissionFactorStore::new(pool)),
//!     FreshnessWindow::new(15, TimeUnit::Minutes)?,
//! );
//!
//! let snapshot = coordinator.lookup(&LookupKey::new("Diesel")?).await?;
//! println!("{} records captured at {}", snapshot.records.len(), snapshot.captured_at);
//! # Ok(())
//! # }
//! ```

mod blob;
mod coordinator;
mod error;
mod freshness;
mod store;
mod types;

pub use blob::{BlobCache, FileBlobCache, HttpBlobCache, MemoryBlobCache};
pub use coordinator::{CacheCoordinator, CoordinatorOptions};
pub use error::{BlobError, LookupError, Result, StoreError};
pub use freshness::{is_fresh, FreshnessWindow, TimeUnit, WindowError};
pub use store::{AuthoritativeStore, MemoryStore, PgEmissionFactorStore};
pub use types::{
    CacheSnapshot, CacheStats, LookupKey, LookupOutcome, Record, RecordSet, SNAPSHOT_SUFFIX,
};

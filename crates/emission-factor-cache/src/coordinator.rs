//! Read-through coordination between the blob cache and the authoritative store

use crate::blob::BlobCache;
use crate::error::{LookupError, Result};
use crate::freshness::{is_fresh, FreshnessWindow};
use crate::store::AuthoritativeStore;
use crate::types::{CacheSnapshot, CacheStats, LookupKey, LookupOutcome};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Behaviour switches for [`CacheCoordinator`]
#[derive(Debug, Clone, Copy)]
pub struct CoordinatorOptions {
    /// Collapse concurrent refreshes of the same key into one store query
    pub single_flight: bool,
    /// Answer with the stale snapshot when the store cannot be reached.
    /// Off by default: a snapshot is never served past its window.
    pub serve_stale_on_store_error: bool,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self {
            single_flight: true,
            serve_stale_on_store_error: false,
        }
    }
}

/// What the blob cache holds for a key right now
enum CacheState {
    Fresh(CacheSnapshot),
    Stale(CacheSnapshot),
    NotFound,
}

/// Serves emission-factor snapshots from the blob cache while they are
/// fresh, refreshing them from the authoritative store otherwise.
pub struct CacheCoordinator {
    blob: Arc<dyn BlobCache>,
    store: Arc<dyn AuthoritativeStore>,
    window: FreshnessWindow,
    options: CoordinatorOptions,
    /// Per-key refresh locks, present only while a refresh is held or awaited
    refresh_locks: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    refreshes: AtomicU64,
    coalesced: AtomicU64,
    stale_served: AtomicU64,
    write_failures: AtomicU64,
}

impl CacheCoordinator {
    pub fn new(
        blob: Arc<dyn BlobCache>,
        store: Arc<dyn AuthoritativeStore>,
        window: FreshnessWindow,
    ) -> Self {
        Self::with_options(blob, store, window, CoordinatorOptions::default())
    }

    pub fn with_options(
        blob: Arc<dyn BlobCache>,
        store: Arc<dyn AuthoritativeStore>,
        window: FreshnessWindow,
        options: CoordinatorOptions,
    ) -> Self {
        Self {
            blob,
            store,
            window,
            options,
            refresh_locks: StdMutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            refreshes: AtomicU64::new(0),
            coalesced: AtomicU64::new(0),
            stale_served: AtomicU64::new(0),
            write_failures: AtomicU64::new(0),
        }
    }

    pub fn window(&self) -> FreshnessWindow {
        self.window
    }

    pub fn options(&self) -> CoordinatorOptions {
        self.options
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            refreshes: self.refreshes.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
            stale_served: self.stale_served.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
        }
    }

    /// Get a fresh snapshot for `key`, refreshing it from the store if needed
    pub async fn lookup(&self, key: &LookupKey) -> Result<CacheSnapshot> {
        self.lookup_with_outcome(key)
            .await
            .map(|(snapshot, _)| snapshot)
    }

    /// Like [`lookup`](Self::lookup), also reporting how the snapshot was obtained
    pub async fn lookup_with_outcome(
        &self,
        key: &LookupKey,
    ) -> Result<(CacheSnapshot, LookupOutcome)> {
        let stale = match self.check_cache(key).await {
            CacheState::Fresh(snapshot) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, "Snapshot cache hit");
                return Ok((snapshot, LookupOutcome::Hit));
            }
            CacheState::Stale(snapshot) => Some(snapshot),
            CacheState::NotFound => None,
        };
        if !self.options.single_flight {
            return self.refresh(key, stale).await;
        }

        // Released on drop, so a cancelled lookup still clears its table entry
        let lease = self.refresh_lease(key);
        let _guard = lease.lock.lock().await;

        // Another task may have refreshed the key while we waited
        match self.check_cache(key).await {
            CacheState::Fresh(snapshot) => {
                self.coalesced.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, "Refresh coalesced with concurrent lookup");
                Ok((snapshot, LookupOutcome::Coalesced))
            }
            CacheState::Stale(snapshot) => self.refresh(key, Some(snapshot)).await,
            CacheState::NotFound => self.refresh(key, stale).await,
        }
    }

    async fn check_cache(&self, key: &LookupKey) -> CacheState {
        match self.blob.get(key).await {
            Ok(Some(snapshot)) => {
                if is_fresh(snapshot.captured_at, Utc::now(), &self.window) {
                    CacheState::Fresh(snapshot)
                } else {
                    debug!(
                        key = %key,
                        captured_at = %snapshot.captured_at,
                        window = %self.window,
                        "Snapshot is stale"
                    );
                    CacheState::Stale(snapshot)
                }
            }
            Ok(None) => CacheState::NotFound,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to read cached snapshot, treating as miss");
                CacheState::NotFound
            }
        }
    }

    async fn refresh(
        &self,
        key: &LookupKey,
        stale: Option<CacheSnapshot>,
    ) -> Result<(CacheSnapshot, LookupOutcome)> {
        self.misses.fetch_add(1, Ordering::Relaxed);

        let records = match self.store.query(key).await {
            Ok(records) => records,
            Err(cause) => {
                if self.options.serve_stale_on_store_error {
                    if let Some(snapshot) = stale {
                        self.stale_served.fetch_add(1, Ordering::Relaxed);
                        warn!(
                            key = %key,
                            error = %cause,
                            captured_at = %snapshot.captured_at,
                            "Emission factor store unavailable, serving stale snapshot"
                        );
                        return Ok((snapshot, LookupOutcome::ServedStale));
                    }
                }
                error!(key = %key, error = %cause, "Emission factor store unavailable");
                return Err(LookupError::StoreUnavailable {
                    key: key.to_string(),
                    cause,
                });
            }
        };

        if records.is_empty() {
            info!(key = %key, "Fuel type not found in emission factor store");
            return Err(LookupError::UnknownKey {
                key: key.to_string(),
            });
        }

        let snapshot = CacheSnapshot::new(Utc::now(), records);

        if let Err(e) = self.blob.put(key, &snapshot).await {
            self.write_failures.fetch_add(1, Ordering::Relaxed);
            warn!(key = %key, error = %e, "Failed to write snapshot to cache");
        }

        self.refreshes.fetch_add(1, Ordering::Relaxed);
        debug!(key = %key, records = snapshot.records.len(), "Refreshed snapshot");

        Ok((snapshot, LookupOutcome::Refreshed))
    }

    fn refresh_lease(&self, key: &LookupKey) -> RefreshLease<'_> {
        let mut locks = self
            .refresh_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let lock = locks
            .entry(key.as_str().to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        RefreshLease {
            locks: &self.refresh_locks,
            key: key.as_str().to_string(),
            lock,
        }
    }
}

/// Claim on a key's refresh lock; drops the table entry once unclaimed
struct RefreshLease<'a> {
    locks: &'a StdMutex<HashMap<String, Arc<Mutex<()>>>>,
    key: String,
    lock: Arc<Mutex<()>>,
}

impl Drop for RefreshLease<'_> {
    fn drop(&mut self) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // One reference in the table plus ours means nobody else holds a lease
        if Arc::strong_count(&self.lock) == 2 {
            locks.remove(&self.key);
        }
    }
}

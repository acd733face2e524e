//! Cache types

use crate::error::LookupError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Suffix appended to a lookup key to form the cached object's name
pub const SNAPSHOT_SUFFIX: &str = ".json";

/// A single emission-factor record with store-defined field names
pub type Record = Map<String, Value>;

/// Records returned by the authoritative store for one key, in store order
pub type RecordSet = Vec<Record>;

/// Fuel-type identifier addressing both the store and the cache
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LookupKey(String);

impl LookupKey {
    /// Create a key, rejecting empty or whitespace-only input
    pub fn new(key: impl Into<String>) -> Result<Self, LookupError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(LookupError::InvalidKey);
        }
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the cached object for this key (`Diesel` -> `Diesel.json`)
    pub fn object_name(&self) -> String {
        format!("{}{}", self.0, SNAPSHOT_SUFFIX)
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LookupKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for LookupKey {
    type Error = LookupError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for LookupKey {
    type Error = LookupError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LookupKey> for String {
    fn from(key: LookupKey) -> Self {
        key.0
    }
}

/// Timestamped copy of a record set, as stored in the blob cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheSnapshot {
    pub captured_at: DateTime<Utc>,
    pub records: RecordSet,
}

impl CacheSnapshot {
    pub fn new(captured_at: DateTime<Utc>, records: RecordSet) -> Self {
        Self {
            captured_at,
            records,
        }
    }
}

/// How a lookup was answered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupOutcome {
    /// Fresh snapshot served straight from the blob cache
    Hit,
    /// Snapshot was missing or stale and has been refreshed from the store
    Refreshed,
    /// Another task refreshed the key while this one waited
    Coalesced,
    /// Store was unreachable and the stale snapshot was served instead
    ServedStale,
}

impl LookupOutcome {
    /// Value for the `X-Cache` response header
    pub fn as_header_value(&self) -> &'static str {
        match self {
            Self::Hit => "HIT",
            Self::Refreshed => "MISS",
            Self::Coalesced => "COALESCED",
            Self::ServedStale => "STALE",
        }
    }
}

/// Statistics about the coordinator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub refreshes: u64,
    pub coalesced: u64,
    pub stale_served: u64,
    pub write_failures: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_key_rejects_empty() {
        assert!(LookupKey::new("").is_err());
        assert!(LookupKey::new("   ").is_err());
        assert_eq!(LookupKey::new("Diesel").unwrap().as_str(), "Diesel");
    }

    #[test]
    fn test_lookup_key_object_name() {
        let key = LookupKey::new("Diesel").unwrap();
        assert_eq!(key.object_name(), "Diesel.json");
    }

    #[test]
    fn test_lookup_key_deserialize_validates() {
        let key: LookupKey = serde_json::from_str("\"CNG\"").unwrap();
        assert_eq!(key.to_string(), "CNG");
        assert!(serde_json::from_str::<LookupKey>("\"\"").is_err());
    }

    #[test]
    fn test_cache_stats_default() {
        let stats = CacheStats::default();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.refreshes, 0);
        assert_eq!(stats.write_failures, 0);
    }

    #[test]
    fn test_snapshot_serialization() {
        let record = json!({ "fuel_type": "Diesel", "THG_emissionfactor_TTW_kgCo2e/l": 2.67 });
        let snapshot = CacheSnapshot::new(Utc::now(), vec![record.as_object().cloned().unwrap()]);

        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("captured_at"));
        assert!(json.contains("THG_emissionfactor_TTW_kgCo2e/l"));

        let deserialized: CacheSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, snapshot);
    }

    #[test]
    fn test_outcome_header_values() {
        assert_eq!(LookupOutcome::Hit.as_header_value(), "HIT");
        assert_eq!(LookupOutcome::Refreshed.as_header_value(), "MISS");
        assert_eq!(LookupOutcome::ServedStale.as_header_value(), "STALE");
    }
}

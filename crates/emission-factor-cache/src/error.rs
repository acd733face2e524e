//! Error types for the emission-factor cache

use std::fmt;

/// Errors returned by [`CacheCoordinator::lookup`](crate::CacheCoordinator::lookup)
#[derive(Debug)]
pub enum LookupError {
    /// The key was empty
    InvalidKey,
    /// The authoritative store holds no record for the key
    UnknownKey { key: String },
    /// The authoritative store could not be queried
    StoreUnavailable { key: String, cause: StoreError },
}

impl LookupError {
    /// Whether retrying the same lookup later may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable { .. })
    }
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidKey => write!(f, "Lookup key must not be empty"),
            Self::UnknownKey { key } => write!(f, "Unknown fuel type: {key}"),
            Self::StoreUnavailable { key, cause } => {
                write!(f, "Emission factor store unavailable for {key}: {cause}")
            }
        }
    }
}

impl std::error::Error for LookupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::StoreUnavailable { cause, .. } => Some(cause),
            _ => None,
        }
    }
}

/// Transport-level failures of the authoritative store
#[derive(Debug)]
pub enum StoreError {
    Database(sqlx::Error),
    Unavailable(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Database(e) => write!(f, "Database error: {e}"),
            Self::Unavailable(msg) => write!(f, "Store unavailable: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Database(e) => Some(e),
            Self::Unavailable(_) => None,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        Self::Database(e)
    }
}

/// Failures reading or writing a cached snapshot
#[derive(Debug)]
pub enum BlobError {
    Io(Box<std::io::Error>),
    Json(serde_json::Error),
    Http(reqwest::Error),
    /// Object store answered with a non-success status
    Status(u16),
}

impl fmt::Display for BlobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "Blob IO error: {e}"),
            Self::Json(e) => write!(f, "Blob JSON error: {e}"),
            Self::Http(e) => write!(f, "Blob HTTP error: {e}"),
            Self::Status(status) => write!(f, "Blob store returned status {status}"),
        }
    }
}

impl std::error::Error for BlobError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e.as_ref()),
            Self::Json(e) => Some(e),
            Self::Http(e) => Some(e),
            Self::Status(_) => None,
        }
    }
}

impl From<std::io::Error> for BlobError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(Box::new(e))
    }
}

impl From<serde_json::Error> for BlobError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<reqwest::Error> for BlobError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

pub type Result<T> = std::result::Result<T, LookupError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_unknown_key_display() {
        let err = LookupError::UnknownKey {
            key: "Unobtainium".to_string(),
        };
        assert_eq!(format!("{}", err), "Unknown fuel type: Unobtainium");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_store_unavailable_display_and_source() {
        let err = LookupError::StoreUnavailable {
            key: "Diesel".to_string(),
            cause: StoreError::Unavailable("connection refused".to_string()),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Diesel"));
        assert!(msg.contains("connection refused"));
        assert!(err.source().is_some());
        assert!(err.is_retryable());
    }

    #[test]
    fn test_blob_status_display() {
        let err = BlobError::Status(403);
        assert_eq!(format!("{}", err), "Blob store returned status 403");
    }

    #[test]
    fn test_blob_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: BlobError = io.into();
        assert!(matches!(err, BlobError::Io(_)));
        assert!(format!("{}", err).contains("read-only"));
    }
}

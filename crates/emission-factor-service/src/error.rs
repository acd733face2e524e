//! Error types for the emission factor service

use emission_factor_cache::{BlobError, WindowError};
use std::fmt;

#[derive(Debug)]
pub enum ServiceError {
    Cache(BlobError),
    Database(sqlx::Error),
    Io(Box<std::io::Error>),
    Config(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Cache(err) => write!(f, "Cache error: {}", err),
            ServiceError::Database(err) => write!(f, "Database error: {}", err),
            ServiceError::Io(err) => write!(f, "IO error: {}", err),
            ServiceError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServiceError::Cache(err) => Some(err),
            ServiceError::Database(err) => Some(err),
            ServiceError::Io(err) => Some(err.as_ref()),
            ServiceError::Config(_) => None,
        }
    }
}

impl From<BlobError> for ServiceError {
    fn from(err: BlobError) -> Self {
        ServiceError::Cache(err)
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::Database(err)
    }
}

impl From<std::io::Error> for ServiceError {
    fn from(err: std::io::Error) -> Self {
        ServiceError::Io(Box::new(err))
    }
}

impl From<WindowError> for ServiceError {
    fn from(err: WindowError) -> Self {
        ServiceError::Config(err.to_string())
    }
}

impl From<tracing_subscriber::filter::ParseError> for ServiceError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        ServiceError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ServiceError::Config("missing CACHE_BASE_URL".to_string());
        assert_eq!(
            format!("{}", err),
            "Configuration error: missing CACHE_BASE_URL"
        );
    }

    #[test]
    fn test_cache_error_display() {
        let err = ServiceError::Cache(BlobError::Status(403));
        assert_eq!(
            format!("{}", err),
            "Cache error: Blob store returned status 403"
        );
    }

    #[test]
    fn test_window_error_is_config() {
        let err: ServiceError = WindowError::ZeroInterval.into();
        assert!(matches!(err, ServiceError::Config(_)));
        assert!(format!("{}", err).contains("greater than zero"));
    }

    #[test]
    fn test_bind_failure_is_io() {
        let io = std::io::Error::new(std::io::ErrorKind::AddrInUse, "address in use");
        let err: ServiceError = io.into();
        assert!(matches!(err, ServiceError::Io(_)));
        assert_eq!(format!("{}", err), "IO error: address in use");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_error_is_debug() {
        let err = ServiceError::Config("test".to_string());
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("Config"));
    }
}

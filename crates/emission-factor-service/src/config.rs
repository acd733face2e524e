use crate::error::{Result, ServiceError};
use emission_factor_cache::{CoordinatorOptions, FreshnessWindow, TimeUnit};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Where cached snapshots are kept
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheBackend {
    File { cache_dir: PathBuf },
    Memory { max_entries: u64 },
    Http { base_url: String },
}

/// Service configuration parsed from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub database_max_connections: u32,
    pub run_migrations: bool,
    pub cache_backend: CacheBackend,
    pub freshness_window: FreshnessWindow,
    pub coordinator: CoordinatorOptions,
}

impl Config {
    /// Parse configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Parse configuration from any variable source
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = parse_or(&var, "PORT", 3005)?;

        let database_url = var("DATABASE_URL")
            .unwrap_or_else(|| "postgres://localhost/emission_factors".to_string());
        let database_max_connections = parse_or(&var, "DATABASE_MAX_CONNECTIONS", 5)?;
        let run_migrations = parse_or(&var, "RUN_MIGRATIONS", true)?;

        let cache_backend = match var("CACHE_BACKEND").as_deref().unwrap_or("file") {
            "file" => CacheBackend::File {
                cache_dir: var("CACHE_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("./cache/emission-factors")),
            },
            "memory" => CacheBackend::Memory {
                max_entries: parse_or(&var, "CACHE_MAX_ENTRIES", 1_000)?,
            },
            "http" => CacheBackend::Http {
                base_url: var("CACHE_BASE_URL").ok_or_else(|| {
                    ServiceError::Config("CACHE_BASE_URL is required for the http backend".into())
                })?,
            },
            other => {
                return Err(ServiceError::Config(format!(
                    "Unknown CACHE_BACKEND: {other}"
                )))
            }
        };

        let interval = parse_or(&var, "FRESHNESS_INTERVAL", 15)?;
        let unit = parse_or(&var, "FRESHNESS_UNIT", TimeUnit::Minutes)?;
        let freshness_window = FreshnessWindow::new(interval, unit)?;

        let defaults = CoordinatorOptions::default();
        let coordinator = CoordinatorOptions {
            single_flight: parse_or(&var, "SINGLE_FLIGHT", defaults.single_flight)?,
            serve_stale_on_store_error: parse_or(
                &var,
                "SERVE_STALE_ON_STORE_ERROR",
                defaults.serve_stale_on_store_error,
            )?,
        };

        Ok(Self {
            port,
            database_url,
            database_max_connections,
            run_migrations,
            cache_backend,
            freshness_window,
            coordinator,
        })
    }
}

/// Parse an optional variable, failing on values that do not parse
fn parse_or<T>(var: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match var(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| ServiceError::Config(format!("Invalid {name} '{raw}': {e}"))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 3005);
        assert_eq!(config.database_max_connections, 5);
        assert!(config.run_migrations);
        assert_eq!(
            config.cache_backend,
            CacheBackend::File {
                cache_dir: PathBuf::from("./cache/emission-factors")
            }
        );
        assert_eq!(config.freshness_window, FreshnessWindow::default());
        assert!(config.coordinator.single_flight);
        assert!(!config.coordinator.serve_stale_on_store_error);
    }

    #[test]
    fn test_freshness_window_from_vars() {
        let config = config_from(&[("FRESHNESS_INTERVAL", "2"), ("FRESHNESS_UNIT", "hours")]).unwrap();
        assert_eq!(config.freshness_window.interval(), 2);
        assert_eq!(config.freshness_window.unit(), TimeUnit::Hours);
    }

    #[test]
    fn test_zero_interval_rejected() {
        assert!(config_from(&[("FRESHNESS_INTERVAL", "0")]).is_err());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(config_from(&[("PORT", "not-a-port")]).is_err());
        assert!(config_from(&[("FRESHNESS_UNIT", "weeks")]).is_err());
        assert!(config_from(&[("SINGLE_FLIGHT", "maybe")]).is_err());
        assert!(config_from(&[("CACHE_BACKEND", "s3")]).is_err());
    }

    #[test]
    fn test_http_backend_requires_base_url() {
        assert!(config_from(&[("CACHE_BACKEND", "http")]).is_err());

        let config = config_from(&[
            ("CACHE_BACKEND", "http"),
            ("CACHE_BASE_URL", "http://localhost:9000/emissionfactors"),
        ])
        .unwrap();
        assert_eq!(
            config.cache_backend,
            CacheBackend::Http {
                base_url: "http://localhost:9000/emissionfactors".to_string()
            }
        );
    }

    #[test]
    fn test_memory_backend_and_options() {
        let config = config_from(&[
            ("CACHE_BACKEND", "memory"),
            ("CACHE_MAX_ENTRIES", "50"),
            ("SINGLE_FLIGHT", "false"),
            ("SERVE_STALE_ON_STORE_ERROR", "true"),
        ])
        .unwrap();
        assert_eq!(config.cache_backend, CacheBackend::Memory { max_entries: 50 });
        assert!(!config.coordinator.single_flight);
        assert!(config.coordinator.serve_stale_on_store_error);
    }
}

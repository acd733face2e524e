//! Emission Factor Service - cached emission factor lookups
//!
//! Serves emission factors per fuel type from a snapshot cache, refreshing
//! snapshots from Postgres once they fall outside the freshness window.

mod config;
mod error;
mod server;
mod types;

use crate::config::{CacheBackend, Config};
use crate::error::Result;
use crate::server::{start_server, ServerState, SharedState};
use emission_factor_cache::{
    BlobCache, CacheCoordinator, FileBlobCache, HttpBlobCache, MemoryBlobCache,
    PgEmissionFactorStore,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let env_filter = EnvFilter::from_default_env()
        .add_directive("emission_factor_service=info".parse()?)
        .add_directive("emission_factor_cache=info".parse()?);

    // Use JSON format for GCP Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    };

    info!("Starting Emission Factor Service...");

    let config = Config::from_env()?;
    info!("Port: {}", config.port);
    info!("Cache backend: {:?}", config.cache_backend);
    info!("Freshness window: {}", config.freshness_window);
    info!(
        single_flight = config.coordinator.single_flight,
        serve_stale_on_store_error = config.coordinator.serve_stale_on_store_error,
        "Coordinator options"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect(&config.database_url)
        .await?;
    info!("Connected to database");

    if config.run_migrations {
        emission_factor_db::migrate::migrate(&pool).await?;
    }

    let blob = create_blob_cache(&config.cache_backend).await?;
    let store = Arc::new(PgEmissionFactorStore::new(pool));
    let coordinator =
        CacheCoordinator::with_options(blob, store, config.freshness_window, config.coordinator);

    let state: SharedState = Arc::new(ServerState::new(coordinator));

    // Start HTTP server (blocking)
    start_server(state, config.port).await?;

    Ok(())
}

async fn create_blob_cache(backend: &CacheBackend) -> Result<Arc<dyn BlobCache>> {
    let blob: Arc<dyn BlobCache> = match backend {
        CacheBackend::File { cache_dir } => {
            let cache = FileBlobCache::new(cache_dir.clone());
            cache.init().await?;
            Arc::new(cache)
        }
        CacheBackend::Memory { max_entries } => {
            Arc::new(MemoryBlobCache::with_capacity(*max_entries))
        }
        CacheBackend::Http { base_url } => Arc::new(HttpBlobCache::new(base_url)?),
    };
    Ok(blob)
}

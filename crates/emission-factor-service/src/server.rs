//! HTTP server for emission factor lookups
//!
//! Provides /health and /emission-factors/{fuel_type} endpoints.

use crate::types::{ErrorResponse, HealthResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use emission_factor_cache::{CacheCoordinator, LookupError, LookupKey};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

/// Shared state for the HTTP server
pub struct ServerState {
    pub coordinator: CacheCoordinator,
    pub started_at: DateTime<Utc>,
}

impl ServerState {
    pub fn new(coordinator: CacheCoordinator) -> Self {
        Self {
            coordinator,
            started_at: Utc::now(),
        }
    }
}

pub type SharedState = Arc<ServerState>;

/// Create the HTTP router
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/emission-factors/{fuel_type}", get(get_emission_factors))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(state: SharedState, port: u16) -> std::io::Result<()> {
    let router = create_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await
}

/// Health check endpoint
async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let uptime_secs = (Utc::now() - state.started_at).num_seconds().max(0) as u64;

    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs,
        freshness_window: state.coordinator.window().to_string(),
        cache: state.coordinator.stats(),
    })
}

/// Get the emission factor snapshot for a fuel type
async fn get_emission_factors(
    State(state): State<SharedState>,
    Path(fuel_type): Path<String>,
) -> Response {
    let key = match LookupKey::new(fuel_type) {
        Ok(key) => key,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(e.to_string())))
                .into_response()
        }
    };

    match state.coordinator.lookup_with_outcome(&key).await {
        Ok((snapshot, outcome)) => (
            [("X-Cache", outcome.as_header_value())],
            Json(snapshot),
        )
            .into_response(),
        Err(LookupError::UnknownKey { key }) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::unknown_fuel_type(&key)),
        )
            .into_response(),
        Err(e @ LookupError::StoreUnavailable { .. }) => {
            warn!(fuel_type = %key, error = %e, "Emission factor lookup failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse::new("emission factor store unavailable")),
            )
                .into_response()
        }
        Err(e @ LookupError::InvalidKey) => {
            (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(e.to_string()))).into_response()
        }
    }
}

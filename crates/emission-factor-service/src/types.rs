//! Response types for the emission factor service

use emission_factor_cache::CacheStats;
use serde::Serialize;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
    pub freshness_window: String,
    pub cache: CacheStats,
}

/// Error body for failed lookups
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(rename = "wrongFuelType", skip_serializing_if = "Option::is_none")]
    pub wrong_fuel_type: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            wrong_fuel_type: None,
        }
    }

    pub fn unknown_fuel_type(fuel_type: &str) -> Self {
        Self {
            error: "fuel type not found in database".to_string(),
            wrong_fuel_type: Some(fuel_type.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "ok".to_string(),
            uptime_secs: 3600,
            freshness_window: "15 minutes".to_string(),
            cache: CacheStats {
                hits: 500,
                misses: 50,
                ..Default::default()
            },
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(json.contains("15 minutes"));
        assert!(json.contains("500"));
    }

    #[test]
    fn test_unknown_fuel_type_body() {
        let json = serde_json::to_value(ErrorResponse::unknown_fuel_type("Unobtainium")).unwrap();
        assert_eq!(json["error"], "fuel type not found in database");
        assert_eq!(json["wrongFuelType"], "Unobtainium");
    }

    #[test]
    fn test_plain_error_omits_fuel_type() {
        let json = serde_json::to_value(ErrorResponse::new("unavailable")).unwrap();
        assert!(json.get("wrongFuelType").is_none());
    }
}

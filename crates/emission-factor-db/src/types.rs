use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::FromRow;

/// Row of the `emission_factors` table
#[derive(Debug, Clone, FromRow)]
pub struct EmissionFactorRow {
    pub fuel_type: String,
    pub variant: String,
    pub factors: Json<Map<String, Value>>,
    pub updated_at: DateTime<Utc>,
}

impl EmissionFactorRow {
    /// Flatten the row into a single JSON object.
    ///
    /// The factor fields keep their stored names (e.g.
    /// `THG_emissionfactor_TTW_kgCo2e/l`); `fuel_type` and `variant` are added
    /// alongside them and win over factor fields of the same name.
    pub fn into_record(self) -> Map<String, Value> {
        let mut record = self.factors.0;
        record.insert("fuel_type".to_string(), Value::String(self.fuel_type));
        if !self.variant.is_empty() {
            record.insert("variant".to_string(), Value::String(self.variant));
        }
        record
    }
}

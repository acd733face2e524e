//! Postgres-backed emission factor store

use super::AuthoritativeStore;
use crate::error::StoreError;
use crate::types::{LookupKey, RecordSet};
use async_trait::async_trait;
use emission_factor_db::{factors, EmissionFactorRow, PgPool};
use tracing::debug;

/// Reads the `emission_factors` table through a shared connection pool
pub struct PgEmissionFactorStore {
    pool: PgPool,
}

impl PgEmissionFactorStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthoritativeStore for PgEmissionFactorStore {
    async fn query(&self, key: &LookupKey) -> Result<RecordSet, StoreError> {
        let rows = factors::for_fuel_type(&self.pool, key.as_str()).await?;
        debug!(key = %key, rows = rows.len(), "Queried emission factors");
        Ok(rows.into_iter().map(EmissionFactorRow::into_record).collect())
    }
}

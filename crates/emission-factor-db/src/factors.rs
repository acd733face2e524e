use crate::types::EmissionFactorRow;
use sqlx::PgPool;

/// Get every row stored for a fuel type, ordered by variant
pub async fn for_fuel_type(
    pool: &PgPool,
    fuel_type: &str,
) -> Result<Vec<EmissionFactorRow>, sqlx::Error> {
    sqlx::query_as::<_, EmissionFactorRow>(
        r#"
        SELECT fuel_type, variant, factors, updated_at
        FROM emission_factors
        WHERE fuel_type = $1
        ORDER BY variant
        "#,
    )
    .bind(fuel_type)
    .fetch_all(pool)
    .await
}

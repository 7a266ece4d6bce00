//! PostgreSQL-backed [`L2Store`]
//!
//! Expected schema (see `migrations/` in a real deployment):
//!
//! ```sql
//! CREATE TABLE feature_values (
//!     id BIGSERIAL PRIMARY KEY,
//!     ticker TEXT NOT NULL,
//!     feature_name TEXT NOT NULL,
//!     value DOUBLE PRECISION,
//!     is_absent BOOLEAN NOT NULL,
//!     as_of TIMESTAMPTZ NOT NULL,
//!     calculated_at TIMESTAMPTZ NOT NULL,
//!     version INTEGER NOT NULL,
//!     metadata JSONB NOT NULL DEFAULT '{}',
//!     instance_id UUID NOT NULL,
//!     superseded BOOLEAN NOT NULL DEFAULT FALSE,
//!     UNIQUE (ticker, feature_name, as_of, version)
//! );
//! CREATE INDEX feature_values_lookup ON feature_values (ticker, feature_name, as_of DESC);
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use feature_store_core::{FeatureKey, FeatureValue, ScalarValue, SourceTier, TtlClass, Value};
use sqlx::postgres::PgPool;
use sqlx::Row;
use std::collections::HashMap;

use crate::traits::{L2Row, L2Store};
use crate::{RepositoryError, RepositoryResult};

pub struct PostgresL2Store {
    pool: PgPool,
}

impl PostgresL2Store {
    pub async fn connect(database_url: &str) -> RepositoryResult<Self> {
        let pool = PgPool::connect(database_url).await.map_err(RepositoryError::Database)?;
        Ok(Self { pool })
    }

    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl L2Store for PostgresL2Store {
    async fn get_many(&self, keys: &[FeatureKey]) -> RepositoryResult<HashMap<FeatureKey, FeatureValue>> {
        let mut out = HashMap::new();
        // No native multi-tuple IN() binding in sqlx without a macro; one
        // round trip per distinct ticker keeps this simple and still far
        // below the L2 latency budget for realistic batch sizes.
        for key in keys {
            let row = sqlx::query(
                r#"
                SELECT value, is_absent, calculated_at, metadata
                FROM feature_values
                WHERE ticker = $1 AND feature_name = $2 AND as_of = $3 AND version = $4 AND superseded = FALSE
                "#,
            )
            .bind(&key.ticker)
            .bind(&key.feature_name)
            .bind(key.as_of())
            .bind(key.version as i32)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::Database)?;

            if let Some(row) = row {
                let is_absent: bool = row.try_get("is_absent").map_err(RepositoryError::Database)?;
                let calculated_at: DateTime<Utc> = row.try_get("calculated_at").map_err(RepositoryError::Database)?;
                let metadata_json: serde_json::Value = row.try_get("metadata").map_err(RepositoryError::Database)?;
                let metadata = serde_json::from_value(metadata_json).unwrap_or(Value::Null);

                let value = if is_absent {
                    FeatureValue::absent(calculated_at, SourceTier::L2, metadata)
                } else {
                    let v: f64 = row.try_get("value").map_err(RepositoryError::Database)?;
                    FeatureValue::present(v, calculated_at, SourceTier::L2, metadata)
                };
                out.insert(key.clone(), value);
            }
        }
        Ok(out)
    }

    async fn put_many(&self, rows: Vec<L2Row>) -> RepositoryResult<()> {
        for row in rows {
            let (value, is_absent) = match row.value.value {
                ScalarValue::Present(v) => (Some(v), false),
                ScalarValue::Absent => (None, true),
            };
            let metadata_json = serde_json::to_value(&row.value.metadata).unwrap_or(serde_json::Value::Null);

            sqlx::query(
                r#"
                INSERT INTO feature_values
                    (ticker, feature_name, value, is_absent, as_of, calculated_at, version, metadata, instance_id, superseded)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, FALSE)
                ON CONFLICT (ticker, feature_name, as_of, version) DO UPDATE SET
                    value = EXCLUDED.value,
                    is_absent = EXCLUDED.is_absent,
                    calculated_at = EXCLUDED.calculated_at,
                    metadata = EXCLUDED.metadata,
                    instance_id = EXCLUDED.instance_id,
                    superseded = FALSE
                WHERE (EXCLUDED.calculated_at, EXCLUDED.instance_id) > (feature_values.calculated_at, feature_values.instance_id)
                "#,
            )
            .bind(&row.key.ticker)
            .bind(&row.key.feature_name)
            .bind(value)
            .bind(is_absent)
            .bind(row.key.as_of())
            .bind(row.value.calculated_at)
            .bind(row.key.version as i32)
            .bind(metadata_json)
            .bind(row.instance_id)
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::Database)?;
        }
        Ok(())
    }

    async fn scan(&self, ticker: &str, feature_name: &str, as_of_range: (DateTime<Utc>, DateTime<Utc>), version: u32) -> RepositoryResult<Vec<L2Row>> {
        let (start, end) = as_of_range;
        let rows = sqlx::query(
            r#"
            SELECT ticker, feature_name, as_of, value, is_absent, calculated_at, version, metadata, instance_id, superseded
            FROM feature_values
            WHERE ticker = $1 AND feature_name = $2 AND version = $3 AND as_of BETWEEN $4 AND $5
            ORDER BY as_of DESC
            "#,
        )
        .bind(ticker)
        .bind(feature_name)
        .bind(version as i32)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::Database)?;

        rows.into_iter()
            .map(|row| {
                let as_of: DateTime<Utc> = row.try_get("as_of").map_err(RepositoryError::Database)?;
                let key = FeatureKey::new(ticker, feature_name, as_of, TtlClass::Daily, version).map_err(|e| RepositoryError::Other(e.to_string()))?;
                let is_absent: bool = row.try_get("is_absent").map_err(RepositoryError::Database)?;
                let calculated_at: DateTime<Utc> = row.try_get("calculated_at").map_err(RepositoryError::Database)?;
                let metadata_json: serde_json::Value = row.try_get("metadata").map_err(RepositoryError::Database)?;
                let metadata = serde_json::from_value(metadata_json).unwrap_or(Value::Null);
                let value = if is_absent {
                    FeatureValue::absent(calculated_at, SourceTier::L2, metadata)
                } else {
                    let v: f64 = row.try_get("value").map_err(RepositoryError::Database)?;
                    FeatureValue::present(v, calculated_at, SourceTier::L2, metadata)
                };
                Ok(L2Row {
                    id: Some(row.try_get::<i64, _>("id").unwrap_or_default()),
                    key,
                    value,
                    instance_id: row.try_get("instance_id").map_err(RepositoryError::Database)?,
                    superseded: row.try_get("superseded").map_err(RepositoryError::Database)?,
                })
            })
            .collect()
    }

    async fn invalidate_range(&self, ticker: &str, feature_name: &str, as_of_range: (DateTime<Utc>, DateTime<Utc>)) -> RepositoryResult<usize> {
        let (start, end) = as_of_range;
        let result = sqlx::query(
            r#"
            UPDATE feature_values
            SET superseded = TRUE
            WHERE ticker = $1 AND feature_name = $2 AND as_of BETWEEN $3 AND $4 AND superseded = FALSE
            "#,
        )
        .bind(ticker)
        .bind(feature_name)
        .bind(start)
        .bind(end)
        .execute(&self.pool)
        .await
        .map_err(RepositoryError::Database)?;

        Ok(result.rows_affected() as usize)
    }
}

//! PostgreSQL record store
//!
//! Documents are stored as JSONB in the `records` table. Filters become a
//! containment test (`payload @> $filter`) served by the GIN index, and
//! listings follow the table's insertion sequence.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::{debug, instrument};
use uuid::Uuid;

use core_kernel::{
    AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable, PortError, RecordFilter,
    RecordStore,
};

use crate::error::DatabaseError;

const ADAPTER_ID: &str = "postgres-record-store";

const SELECT_ONE: &str = "SELECT payload FROM records WHERE collection = $1 AND id = $2";

const SELECT_MATCHING: &str =
    "SELECT payload FROM records WHERE collection = $1 AND payload @> $2 ORDER BY seq";

const UPSERT: &str = "INSERT INTO records (collection, id, payload) VALUES ($1, $2, $3) \
     ON CONFLICT (collection, id) DO UPDATE SET payload = EXCLUDED.payload, updated_at = now()";

const DELETE: &str = "DELETE FROM records WHERE collection = $1 AND id = $2";

fn port_error(error: sqlx::Error) -> PortError {
    PortError::from(DatabaseError::from(&error))
}

/// `RecordStore` over a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PostgresRecordStore {
    pool: PgPool,
}

impl PostgresRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl DomainPort for PostgresRecordStore {}

#[async_trait]
impl HealthCheckable for PostgresRecordStore {
    /// Runs `SELECT 1` against the pool
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();
        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await;
        let latency_ms = start.elapsed().as_millis() as u64;

        let (status, message) = match result {
            Ok(_) => (AdapterHealth::Healthy, None),
            Err(e) => (AdapterHealth::Unhealthy, Some(format!("Database error: {}", e))),
        };
        HealthCheckResult {
            adapter_id: ADAPTER_ID.to_string(),
            status,
            latency_ms,
            message,
            checked_at: Utc::now(),
        }
    }
}

#[async_trait]
impl RecordStore for PostgresRecordStore {
    #[instrument(skip(self))]
    async fn get_raw(&self, collection: &str, id: Uuid) -> Result<Option<Value>, PortError> {
        let row = sqlx::query_scalar::<_, Json<Value>>(SELECT_ONE)
            .bind(collection)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(port_error)?;
        Ok(row.map(|Json(payload)| payload))
    }

    #[instrument(skip(self, filter))]
    async fn list_raw(&self, collection: &str, filter: &RecordFilter) -> Result<Vec<Value>, PortError> {
        let rows = sqlx::query_scalar::<_, Json<Value>>(SELECT_MATCHING)
            .bind(collection)
            .bind(Json(filter.to_json()))
            .fetch_all(&self.pool)
            .await
            .map_err(port_error)?;
        debug!(collection, count = rows.len(), "Listed records");
        Ok(rows.into_iter().map(|Json(payload)| payload).collect())
    }

    #[instrument(skip(self, payload))]
    async fn put_raw(&self, collection: &str, id: Uuid, payload: Value) -> Result<(), PortError> {
        if !payload.is_object() {
            return Err(PortError::validation_field(
                "record payload must be a JSON object",
                "payload",
            ));
        }
        sqlx::query(UPSERT)
            .bind(collection)
            .bind(id)
            .bind(Json(payload))
            .execute(&self.pool)
            .await
            .map_err(port_error)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_raw(&self, collection: &str, id: Uuid) -> Result<bool, PortError> {
        let result = sqlx::query(DELETE)
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(port_error)?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::UnitId;

    #[test]
    fn test_filter_serializes_as_containment_document() {
        let unit = UnitId::new();
        let filter = RecordFilter::new()
            .eq("unit_id", unit)
            .eq("pairing_id", Value::Null);

        let doc = filter.to_json();
        assert_eq!(doc["unit_id"], Value::String(unit.as_uuid().to_string()));
        assert!(doc["pairing_id"].is_null());
        assert!(doc.as_object().is_some_and(|o| o.len() == 2));
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert_eq!(RecordFilter::new().to_json(), serde_json::json!({}));
    }

    #[tokio::test]
    async fn test_unreachable_database_reports_unhealthy() {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_millis(200))
            .connect_lazy("postgres://nobody@127.0.0.1:1/none")
            .unwrap();
        let store = PostgresRecordStore::new(pool);

        let health = store.health_check().await;
        assert_eq!(health.status, AdapterHealth::Unhealthy);
        assert_eq!(health.adapter_id, ADAPTER_ID);
    }
}

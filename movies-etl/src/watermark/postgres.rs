//! Postgres-backed watermark store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::debug;

use movies_search_shared::EntityKind;

use super::WatermarkStore;
use crate::errors::SyncError;

const ENSURE_SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS etl_watermarks (
    entity_kind   text PRIMARY KEY,
    last_modified timestamptz NOT NULL
)
"#;

const LOAD_SQL: &str = "SELECT last_modified FROM etl_watermarks WHERE entity_kind = $1";

const STORE_SQL: &str = r#"
INSERT INTO etl_watermarks (entity_kind, last_modified)
VALUES ($1, $2)
ON CONFLICT (entity_kind) DO UPDATE SET last_modified = EXCLUDED.last_modified
"#;

/// Watermark store persisted in the relational database, so watermarks
/// survive process restarts.
pub struct PostgresWatermarkStore {
    pool: PgPool,
}

impl PostgresWatermarkStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the watermark table if it does not exist. Called once at
    /// startup.
    pub async fn ensure_schema(&self) -> Result<(), SyncError> {
        sqlx::query(ENSURE_SCHEMA_SQL)
            .execute(&self.pool)
            .await
            .map_err(|e| SyncError::watermark(format!("creating watermark table: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl WatermarkStore for PostgresWatermarkStore {
    async fn load(&self, kind: EntityKind) -> Result<DateTime<Utc>, SyncError> {
        let row = sqlx::query(LOAD_SQL)
            .bind(kind.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| SyncError::watermark(format!("loading watermark for {}: {}", kind, e)))?;

        // Absent row means the kind has never completed a batch
        Ok(match row {
            Some(row) => row.get("last_modified"),
            None => DateTime::UNIX_EPOCH,
        })
    }

    async fn store(&self, kind: EntityKind, modified: DateTime<Utc>) -> Result<(), SyncError> {
        sqlx::query(STORE_SQL)
            .bind(kind.as_str())
            .bind(modified)
            .execute(&self.pool)
            .await
            .map_err(|e| SyncError::watermark(format!("storing watermark for {}: {}", kind, e)))?;

        debug!(kind = %kind, watermark = %modified, "Watermark advanced");
        Ok(())
    }
}

//! Per-kind sync watermarks.
//!
//! A watermark records the modification timestamp up to which an entity
//! kind has been fully synchronized. It starts at the Unix epoch on first
//! run, moves forward only after a batch is confirmed indexed, and is
//! never rolled back by the pipeline itself.

pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use movies_search_shared::EntityKind;

use crate::errors::SyncError;

pub use postgres::PostgresWatermarkStore;

/// Persistent store for sync watermarks, one timestamp per entity kind.
#[async_trait]
pub trait WatermarkStore: Send + Sync {
    /// Load the watermark for `kind`, or the epoch if none exists yet.
    async fn load(&self, kind: EntityKind) -> Result<DateTime<Utc>, SyncError>;

    /// Persist a new watermark for `kind`. Writes are single-row upserts
    /// and therefore atomic per batch.
    async fn store(&self, kind: EntityKind, modified: DateTime<Utc>) -> Result<(), SyncError>;
}

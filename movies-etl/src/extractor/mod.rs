//! Row extraction from the relational store.
//!
//! The extractor reads rows in bounded pages ordered by modification
//! timestamp ascending, starting just past a per-kind watermark. Media
//! rows arrive already denormalized: the persons (with role) and genre
//! aggregations happen once, in SQL at this boundary, not in the search
//! layer.

pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use movies_search_shared::EntityKind;
use uuid::Uuid;

use crate::errors::SyncError;

pub use postgres::PostgresRowSource;

/// A denormalized media row as extracted from Postgres.
///
/// `persons` holds the JSON aggregation text produced by the extraction
/// query: an array of `{person_id, role, full_name}` objects. Parsing it
/// is the transformer's job so extraction stays a thin I/O boundary.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MediaRow {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub rating: Option<f64>,
    pub genres: Vec<String>,
    pub persons: String,
    pub modified: DateTime<Utc>,
}

/// A person row with its associated media identifiers.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PersonRow {
    pub id: Uuid,
    pub full_name: String,
    pub media_ids: Vec<Uuid>,
    pub modified: DateTime<Utc>,
}

/// A genre row with its associated media identifiers.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GenreRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub media_ids: Vec<Uuid>,
    pub modified: DateTime<Utc>,
}

/// A raw row of any entity kind.
#[derive(Debug, Clone)]
pub enum RawRow {
    Media(MediaRow),
    Person(PersonRow),
    Genre(GenreRow),
}

impl RawRow {
    /// The row's primary identifier.
    pub fn id(&self) -> Uuid {
        match self {
            RawRow::Media(row) => row.id,
            RawRow::Person(row) => row.id,
            RawRow::Genre(row) => row.id,
        }
    }

    /// The row's modification timestamp, which orders extraction pages
    /// and drives the watermark.
    pub fn modified(&self) -> DateTime<Utc> {
        match self {
            RawRow::Media(row) => row.modified,
            RawRow::Person(row) => row.modified,
            RawRow::Genre(row) => row.modified,
        }
    }
}

/// Source of raw rows for the sync driver.
///
/// `since` and `offset` together form a stable pagination cursor because
/// rows are always ordered by modification timestamp ascending and
/// `since` stays fixed for the whole cycle. Rows already seen within a
/// cycle may reappear if the store mutates concurrently; re-indexing them
/// is harmless because the loader upserts.
#[async_trait]
pub trait RowSource: Send + Sync {
    /// Fetch one page of rows of `kind` modified strictly after `since`.
    async fn fetch_page(
        &self,
        kind: EntityKind,
        since: DateTime<Utc>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<RawRow>, SyncError>;
}

//! Postgres implementation of the row source.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;

use movies_search_shared::EntityKind;

use super::{GenreRow, MediaRow, PersonRow, RawRow, RowSource};
use crate::errors::SyncError;
use crate::retry::{self, RetryPolicy};

/// Media rows, denormalized in SQL: every participating person with role
/// and every genre name travel with the film row.
const MEDIA_PAGE_SQL: &str = r#"
SELECT fw.id,
       fw.title,
       fw.description,
       fw.rating,
       COALESCE(
           array_agg(DISTINCT g.name) FILTER (WHERE g.id IS NOT NULL),
           '{}'
       ) AS genres,
       COALESCE(
           json_agg(
               DISTINCT jsonb_build_object(
                   'person_id', p.id,
                   'role', pfw.role,
                   'full_name', p.full_name
               )
           ) FILTER (WHERE p.id IS NOT NULL),
           '[]'
       )::text AS persons,
       fw.modified
FROM content.film_work fw
LEFT JOIN content.person_film_work pfw ON pfw.film_work_id = fw.id
LEFT JOIN content.person p ON p.id = pfw.person_id
LEFT JOIN content.genre_film_work gfw ON gfw.film_work_id = fw.id
LEFT JOIN content.genre g ON g.id = gfw.genre_id
WHERE fw.modified > $1
GROUP BY fw.id
ORDER BY fw.modified
LIMIT $2 OFFSET $3
"#;

const PERSON_PAGE_SQL: &str = r#"
SELECT p.id,
       p.full_name,
       COALESCE(
           array_agg(DISTINCT pfw.film_work_id) FILTER (WHERE pfw.film_work_id IS NOT NULL),
           '{}'
       ) AS media_ids,
       p.modified
FROM content.person p
LEFT JOIN content.person_film_work pfw ON pfw.person_id = p.id
WHERE p.modified > $1
GROUP BY p.id
ORDER BY p.modified
LIMIT $2 OFFSET $3
"#;

const GENRE_PAGE_SQL: &str = r#"
SELECT g.id,
       g.name,
       g.description,
       COALESCE(
           array_agg(DISTINCT gfw.film_work_id) FILTER (WHERE gfw.film_work_id IS NOT NULL),
           '{}'
       ) AS media_ids,
       g.modified
FROM content.genre g
LEFT JOIN content.genre_film_work gfw ON gfw.genre_id = g.id
WHERE g.modified > $1
GROUP BY g.id
ORDER BY g.modified
LIMIT $2 OFFSET $3
"#;

/// Row source backed by the Postgres system-of-record.
///
/// Holds a handle to the process-wide connection pool; transient query
/// failures are retried with the shared backoff policy before surfacing
/// to the driver.
pub struct PostgresRowSource {
    pool: PgPool,
    retry: RetryPolicy,
}

impl PostgresRowSource {
    pub fn new(pool: PgPool, retry: RetryPolicy) -> Self {
        Self { pool, retry }
    }

    async fn query_page(
        &self,
        kind: EntityKind,
        since: DateTime<Utc>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<RawRow>, sqlx::Error> {
        let rows = match kind {
            EntityKind::Media => sqlx::query_as::<_, MediaRow>(MEDIA_PAGE_SQL)
                .bind(since)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
                .into_iter()
                .map(RawRow::Media)
                .collect::<Vec<_>>(),
            EntityKind::Person => sqlx::query_as::<_, PersonRow>(PERSON_PAGE_SQL)
                .bind(since)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
                .into_iter()
                .map(RawRow::Person)
                .collect::<Vec<_>>(),
            EntityKind::Genre => sqlx::query_as::<_, GenreRow>(GENRE_PAGE_SQL)
                .bind(since)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
                .into_iter()
                .map(RawRow::Genre)
                .collect::<Vec<_>>(),
        };

        debug!(kind = %kind, offset = offset, count = rows.len(), "Extracted page");
        Ok(rows)
    }
}

#[async_trait]
impl RowSource for PostgresRowSource {
    async fn fetch_page(
        &self,
        kind: EntityKind,
        since: DateTime<Utc>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<RawRow>, SyncError> {
        retry::with_backoff(&self.retry, "extract page", || {
            self.query_page(kind, since, offset, limit)
        })
        .await
        .map_err(|e| SyncError::extract(format!("extracting {} rows: {}", kind, e)))
    }
}

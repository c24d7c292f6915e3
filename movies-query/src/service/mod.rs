//! The generic cache-aside query service.
//!
//! One code path serves all three entity kinds; a service instance is
//! parameterized by its kind (index name, ranking field) and its
//! document type's serde implementation. Instances are constructed once
//! at process startup and injected into request handlers.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use movies_search_repository::{PageRequest, SearchIndexProvider};
use movies_search_shared::{
    EntityKind, GenreDocument, ListParams, MediaDocument, PersonDocument,
};

use crate::cache::{keys, CacheStore};
use crate::errors::QueryError;

/// Default cache entry time-to-live: five minutes.
///
/// Short enough that newly-indexed data becomes visible promptly, long
/// enough to absorb repeated identical queries.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Cache-aside query service for one entity kind.
///
/// Reads check the cache first and fall back to the search index on a
/// miss, then repopulate the cache. Cache failures are swallowed with a
/// warning — the index is authoritative and a degraded cache must never
/// fail a read. Index failures surface to the caller. Concurrent misses
/// for the same key are not deduplicated; index reads are idempotent and
/// cache writes are last-write-wins, so duplicated work is harmless.
pub struct QueryService<T> {
    index: Arc<dyn SearchIndexProvider>,
    cache: Arc<dyn CacheStore>,
    kind: EntityKind,
    cache_ttl: Duration,
    _entity: PhantomData<fn() -> T>,
}

/// Query service over media documents, listing by rating.
pub type MediaQueryService = QueryService<MediaDocument>;
/// Query service over person documents, listing by name.
pub type PersonQueryService = QueryService<PersonDocument>;
/// Query service over genre documents, listing by name.
pub type GenreQueryService = QueryService<GenreDocument>;

impl QueryService<MediaDocument> {
    pub fn media(index: Arc<dyn SearchIndexProvider>, cache: Arc<dyn CacheStore>) -> Self {
        Self::for_kind(index, cache, EntityKind::Media)
    }
}

impl QueryService<PersonDocument> {
    pub fn person(index: Arc<dyn SearchIndexProvider>, cache: Arc<dyn CacheStore>) -> Self {
        Self::for_kind(index, cache, EntityKind::Person)
    }
}

impl QueryService<GenreDocument> {
    pub fn genre(index: Arc<dyn SearchIndexProvider>, cache: Arc<dyn CacheStore>) -> Self {
        Self::for_kind(index, cache, EntityKind::Genre)
    }
}

impl<T> QueryService<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    fn for_kind(
        index: Arc<dyn SearchIndexProvider>,
        cache: Arc<dyn CacheStore>,
        kind: EntityKind,
    ) -> Self {
        Self {
            index,
            cache,
            kind,
            cache_ttl: DEFAULT_CACHE_TTL,
            _entity: PhantomData,
        }
    }

    /// Override the cache TTL (mostly for tests and tuning).
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Look up a single entity by identifier.
    ///
    /// Returns `Ok(None)` when the entity is absent from the index.
    /// Absence is never cached, so an entity indexed after a miss is
    /// visible on the next request.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<T>, QueryError> {
        let key = keys::entity_key(id);

        if let Some(raw) = self.cache_get(&key).await {
            match serde_json::from_str::<T>(&raw) {
                Ok(entity) => {
                    debug!(kind = %self.kind, id = id, "Cache hit");
                    return Ok(Some(entity));
                }
                // A stale or corrupt entry falls through to the index
                Err(e) => warn!(key = %key, error = %e, "Discarding undecodable cache entry"),
            }
        }

        let Some(source) = self.index.get_document(self.kind.index(), id).await? else {
            return Ok(None);
        };

        let entity: T = serde_json::from_value(source)
            .map_err(|e| QueryError::decode(format!("document {}: {}", id, e)))?;

        if let Ok(serialized) = serde_json::to_string(&entity) {
            self.cache_put(&key, &serialized).await;
        }

        Ok(Some(entity))
    }

    /// Fetch one page of entities, sorted by the kind's ranking field.
    ///
    /// An empty page is a valid outcome, distinct from an error, and is
    /// cached like any other result so repeated empty queries stay cheap
    /// (bounded by the TTL).
    pub async fn list(&self, params: &ListParams) -> Result<Vec<T>, QueryError> {
        let key = keys::listing_key(self.kind.index(), params);

        if let Some(raw) = self.cache_get(&key).await {
            match serde_json::from_str::<Vec<T>>(&raw) {
                Ok(entities) => {
                    debug!(kind = %self.kind, key = %key, "Cache hit");
                    return Ok(entities);
                }
                Err(e) => warn!(key = %key, error = %e, "Discarding undecodable cache entry"),
            }
        }

        let page = PageRequest {
            sort_field: self.kind.sort_field().to_string(),
            sort_descending: params.sort_descending,
            offset: params.offset(),
            size: i64::from(params.page_size),
            rating_floor: params.effective_rating_floor(),
        };

        let sources = self.index.search_page(self.kind.index(), &page).await?;

        let entities: Vec<T> = sources
            .into_iter()
            .map(|source| {
                serde_json::from_value(source)
                    .map_err(|e| QueryError::decode(format!("listing document: {}", e)))
            })
            .collect::<Result<_, _>>()?;

        if let Ok(serialized) = serde_json::to_string(&entities) {
            self.cache_put(&key, &serialized).await;
        }

        Ok(entities)
    }

    /// Best-effort cache read; failures degrade to an index read.
    async fn cache_get(&self, key: &str) -> Option<String> {
        match self.cache.get(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache read failed, falling back to index");
                None
            }
        }
    }

    /// Best-effort cache write; a failure must not fail the read that
    /// triggered it.
    async fn cache_put(&self, key: &str, value: &str) {
        if let Err(e) = self.cache.set(key, value, self.cache_ttl).await {
            warn!(key = %key, error = %e, "Cache write failed");
        }
    }
}

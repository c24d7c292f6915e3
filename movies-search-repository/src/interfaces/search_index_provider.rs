//! Search index provider trait definition.
//!
//! This module defines the abstract interface for search index operations,
//! allowing for different backend implementations (OpenSearch,
//! Elasticsearch, etc.).

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::SearchIndexError;
use crate::types::{BulkDocument, PageRequest};

/// Abstracts the underlying search index implementation.
///
/// Implementations are injected into the sync loader and the query
/// services to enable dependency injection and easy testing with mock
/// implementations. All methods return `Result<T, SearchIndexError>` for
/// consistent error handling across backends.
///
/// # Note on Document Creation
///
/// There is no separate create operation. `bulk_upsert` writes every
/// document by id: a new id creates the document, an existing id
/// overwrites it. This is what makes re-loading an already-indexed batch
/// safe (at-least-once delivery with idempotent writes).
#[async_trait]
pub trait SearchIndexProvider: Send + Sync {
    /// Ensure all search indices exist, creating them with their settings
    /// and mappings if necessary.
    ///
    /// Called once during application startup, before any document
    /// operation.
    async fn ensure_indexes_exist(&self) -> Result<(), SearchIndexError>;

    /// Upsert a batch of documents into `index` with a single bulk request.
    ///
    /// The batch either fully succeeds or the whole call fails; item-level
    /// failures inside the bulk response are surfaced as a
    /// `BulkIndexError` so the caller can retry the batch as a unit.
    async fn bulk_upsert(
        &self,
        index: &str,
        documents: &[BulkDocument],
    ) -> Result<(), SearchIndexError>;

    /// Fetch a single document's source by identifier.
    ///
    /// Returns `Ok(None)` when the document is absent; absence is a
    /// normal outcome, not an error.
    async fn get_document(&self, index: &str, id: &str)
        -> Result<Option<Value>, SearchIndexError>;

    /// Fetch one page of documents, sorted and optionally filtered.
    ///
    /// Returns the document sources in ranking order. An empty page is a
    /// valid result, distinct from an error.
    async fn search_page(
        &self,
        index: &str,
        page: &PageRequest,
    ) -> Result<Vec<Value>, SearchIndexError>;
}

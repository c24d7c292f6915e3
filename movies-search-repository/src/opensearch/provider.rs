//! OpenSearch provider implementation.
//!
//! This module provides the concrete implementation of
//! `SearchIndexProvider` using the OpenSearch Rust crate.

use async_trait::async_trait;
use opensearch::{
    http::request::JsonBody,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesExistsParts},
    BulkParts, GetParts, OpenSearch, SearchParts,
};
use serde_json::{json, Value};
use tracing::{debug, error, info};
use url::Url;

use movies_search_shared::EntityKind;

use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::opensearch::index_config;
use crate::types::{BulkDocument, PageRequest};

/// OpenSearch provider implementation.
///
/// Owns a single process-wide client over a connection pool; the client
/// is reused across all sync batches and query requests.
pub struct OpenSearchProvider {
    client: OpenSearch,
}

impl OpenSearchProvider {
    /// Create a new OpenSearch provider connected to the specified URL.
    pub fn new(url: &str) -> Result<Self, SearchIndexError> {
        let parsed_url =
            Url::parse(url).map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(url = %url, "Created OpenSearch provider");

        Ok(Self { client })
    }

    /// Create one index with its settings if it does not already exist.
    async fn ensure_index(&self, kind: EntityKind) -> Result<(), SearchIndexError> {
        let index = kind.index();

        let exists = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        if exists.status_code().is_success() {
            debug!(index = %index, "Index already exists");
            return Ok(());
        }

        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(index))
            .body(index_config::index_settings(kind))
            .send()
            .await
            .map_err(|e| SearchIndexError::index_creation(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(index = %index, status = %status, body = %error_body, "Index creation failed");
            return Err(SearchIndexError::index_creation(format!(
                "Creating index {} failed with status {}: {}",
                index, status, error_body
            )));
        }

        info!(index = %index, "Created index");
        Ok(())
    }

    /// Extract the first item-level error reason from a bulk response body.
    fn first_bulk_error(body: &Value) -> String {
        body["items"]
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|item| item.get("index"))
            .find_map(|action| action.get("error"))
            .map(|err| err.to_string())
            .unwrap_or_else(|| "unknown bulk failure".to_string())
    }
}

#[async_trait]
impl SearchIndexProvider for OpenSearchProvider {
    async fn ensure_indexes_exist(&self) -> Result<(), SearchIndexError> {
        for kind in EntityKind::ALL {
            self.ensure_index(kind).await?;
        }
        Ok(())
    }

    /// Upsert a batch of documents with a single `_bulk` request.
    ///
    /// Each document is written with an `index` action keyed by its id,
    /// so an already-present document is overwritten rather than
    /// duplicated. Item-level failures fail the whole batch.
    async fn bulk_upsert(
        &self,
        index: &str,
        documents: &[BulkDocument],
    ) -> Result<(), SearchIndexError> {
        if documents.is_empty() {
            return Ok(());
        }

        let mut body: Vec<JsonBody<Value>> = Vec::with_capacity(documents.len() * 2);
        for doc in documents {
            body.push(json!({ "index": { "_id": doc.id } }).into());
            body.push(doc.source.clone().into());
        }

        let response = self
            .client
            .bulk(BulkParts::Index(index))
            .body(body)
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(index = %index, status = %status, body = %error_body, "Bulk request failed");
            return Err(SearchIndexError::bulk_index(format!(
                "Bulk upsert failed with status {}: {}",
                status, error_body
            )));
        }

        let response_body: Value = response
            .json()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))?;

        if response_body["errors"].as_bool().unwrap_or(false) {
            let reason = Self::first_bulk_error(&response_body);
            error!(index = %index, reason = %reason, "Bulk upsert reported item failures");
            return Err(SearchIndexError::bulk_index(reason));
        }

        debug!(index = %index, count = documents.len(), "Bulk upsert complete");
        Ok(())
    }

    async fn get_document(
        &self,
        index: &str,
        id: &str,
    ) -> Result<Option<Value>, SearchIndexError> {
        let response = self
            .client
            .get(GetParts::IndexId(index, id))
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let status = response.status_code();

        // 404 means the document is absent, which is a normal outcome
        if status.as_u16() == 404 {
            return Ok(None);
        }

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(index = %index, status = %status, body = %error_body, "Get request failed");
            return Err(SearchIndexError::search(format!(
                "Get failed with status {}: {}",
                status, error_body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))?;

        Ok(body.get("_source").cloned())
    }

    async fn search_page(
        &self,
        index: &str,
        page: &PageRequest,
    ) -> Result<Vec<Value>, SearchIndexError> {
        let query = match page.rating_floor {
            Some(floor) => json!({ "range": { "rating": { "gte": floor } } }),
            None => json!({ "match_all": {} }),
        };

        let direction = if page.sort_descending { "desc" } else { "asc" };
        let sort = format!("{}:{}", page.sort_field, direction);

        let response = self
            .client
            .search(SearchParts::Index(&[index]))
            .from(page.offset)
            .size(page.size)
            .sort(&[sort.as_str()])
            .body(json!({ "query": query }))
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(index = %index, status = %status, body = %error_body, "Search request failed");
            return Err(SearchIndexError::search(format!(
                "Search failed with status {}: {}",
                status, error_body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))?;

        let hits = body["hits"]["hits"]
            .as_array()
            .cloned()
            .unwrap_or_default();

        Ok(hits
            .into_iter()
            .filter_map(|hit| hit.get("_source").cloned())
            .collect())
    }
}

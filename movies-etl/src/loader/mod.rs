//! Loader for the sync pipeline.
//!
//! Sends each transformed batch to the search index as a single bulk
//! upsert, retrying transient failures with exponential backoff. On
//! exhaustion the error propagates so the driver leaves the watermark
//! where it was — silent data loss is exactly what this retry policy
//! exists to prevent.

use std::sync::Arc;

use tracing::{debug, instrument};

use movies_search_repository::{BulkDocument, SearchIndexProvider};

use crate::errors::SyncError;
use crate::retry::{self, RetryPolicy};

/// Loader that indexes documents into the search engine.
pub struct SearchLoader {
    provider: Arc<dyn SearchIndexProvider>,
    retry: RetryPolicy,
}

impl SearchLoader {
    /// Create a loader with the default retry policy.
    pub fn new(provider: Arc<dyn SearchIndexProvider>) -> Self {
        Self {
            provider,
            retry: RetryPolicy::default(),
        }
    }

    /// Create a loader with a custom retry policy.
    pub fn with_policy(provider: Arc<dyn SearchIndexProvider>, retry: RetryPolicy) -> Self {
        Self { provider, retry }
    }

    /// Bulk-upsert one batch into `index`.
    ///
    /// Upsert semantics make re-sending an already-indexed batch an
    /// observational no-op, so the caller may safely retry whole batches.
    #[instrument(skip(self, documents), fields(index = index, count = documents.len()))]
    pub async fn load(&self, index: &str, documents: &[BulkDocument]) -> Result<(), SyncError> {
        if documents.is_empty() {
            return Ok(());
        }

        retry::with_backoff(&self.retry, "bulk upsert", || {
            self.provider.bulk_upsert(index, documents)
        })
        .await
        .map_err(|e| SyncError::load(format!("bulk upsert of {} documents: {}", documents.len(), e)))?;

        debug!("Batch indexed");
        Ok(())
    }
}

//! Dependency initialization and wiring for the sync pipeline.
//!
//! All clients (Postgres pool, OpenSearch transport) are constructed once
//! here at startup and injected explicitly; there are no lazily-built
//! global service instances.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing::info;

use movies_search_repository::{OpenSearchProvider, SearchIndexProvider};

use crate::config::SyncSettings;
use crate::driver::{DriverConfig, SyncDriver};
use crate::extractor::PostgresRowSource;
use crate::loader::SearchLoader;
use crate::retry::{self, RetryPolicy};
use crate::watermark::PostgresWatermarkStore;
use crate::EtlError;

/// Maximum Postgres connections in the process-wide pool.
const MAX_PG_CONNECTIONS: u32 = 10;

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured sync driver ready to run.
    pub driver: SyncDriver,
}

impl Dependencies {
    /// Initialize all dependencies from environment variables.
    pub async fn new() -> Result<Self, EtlError> {
        let settings = SyncSettings::from_env()?;

        info!(
            opensearch_url = %settings.opensearch_url,
            poll_interval_secs = settings.poll_interval.as_secs(),
            page_size = settings.page_size,
            retry_max_attempts = settings.retry.max_attempts,
            "Initializing dependencies"
        );

        // Dependencies may still be coming up when the binary starts,
        // so both connections wait with the shared backoff policy
        let pool = retry::with_backoff(&settings.retry, "connect to postgres", || {
            PgPoolOptions::new()
                .max_connections(MAX_PG_CONNECTIONS)
                .connect(&settings.database_url)
        })
        .await
        .map_err(|e| EtlError::config(format!("Failed to connect to Postgres: {}", e)))?;

        info!("Postgres connection established");

        let provider = OpenSearchProvider::new(&settings.opensearch_url)
            .map_err(|e| EtlError::config(format!("Failed to create OpenSearch provider: {}", e)))?;

        wait_for_indices(&provider, &settings.retry).await?;

        info!("OpenSearch indices ready");

        let provider: Arc<dyn SearchIndexProvider> = Arc::new(provider);

        let watermarks = PostgresWatermarkStore::new(pool.clone());
        watermarks.ensure_schema().await?;

        let source = PostgresRowSource::new(pool, settings.retry.clone());
        let loader = SearchLoader::with_policy(provider, settings.retry.clone());

        let driver = SyncDriver::with_config(
            Arc::new(source),
            loader,
            Arc::new(watermarks),
            DriverConfig {
                poll_interval: settings.poll_interval,
                page_size: settings.page_size,
            },
        );

        Ok(Self { driver })
    }
}

/// Create the indices with their mappings before the first batch,
/// retrying while the search engine comes up.
async fn wait_for_indices(
    provider: &dyn SearchIndexProvider,
    retry: &RetryPolicy,
) -> Result<(), EtlError> {
    retry::with_backoff(retry, "ensure indices", || provider.ensure_indexes_exist())
        .await
        .map_err(|e| EtlError::config(format!("Failed to ensure indices exist: {}", e)))
}

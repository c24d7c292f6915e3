//! Environment-driven settings for the sync pipeline.

use std::env;
use std::time::Duration;

use crate::retry::RetryPolicy;
use crate::EtlError;

/// Default OpenSearch URL.
const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Default sleep between sync cycles, in seconds.
const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

/// Default extraction page size.
const DEFAULT_PAGE_SIZE: i64 = 100;

/// Settings for the sync pipeline, read from the environment.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub database_url: String,
    pub opensearch_url: String,
    pub poll_interval: Duration,
    pub page_size: i64,
    pub retry: RetryPolicy,
}

impl SyncSettings {
    /// Read settings from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `DATABASE_URL`: Postgres connection URL (required)
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `SYNC_POLL_INTERVAL_SECS`: sleep between cycles (default: 30)
    /// - `SYNC_PAGE_SIZE`: extraction page size (default: 100)
    /// - `SYNC_RETRY_MAX_ATTEMPTS`: retry attempts per operation (default: 5)
    /// - `SYNC_RETRY_BASE_DELAY_MS`: first backoff delay (default: 500)
    /// - `SYNC_RETRY_MAX_DELAY_MS`: backoff delay cap (default: 10000)
    pub fn from_env() -> Result<Self, EtlError> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| EtlError::config("DATABASE_URL must be set"))?;
        let opensearch_url =
            env::var("OPENSEARCH_URL").unwrap_or_else(|_| DEFAULT_OPENSEARCH_URL.to_string());

        let poll_interval = Duration::from_secs(env_parsed(
            "SYNC_POLL_INTERVAL_SECS",
            DEFAULT_POLL_INTERVAL_SECS,
        ));
        let page_size = env_parsed("SYNC_PAGE_SIZE", DEFAULT_PAGE_SIZE);

        let defaults = RetryPolicy::default();
        let retry = RetryPolicy {
            max_attempts: env_parsed("SYNC_RETRY_MAX_ATTEMPTS", defaults.max_attempts),
            base_delay: Duration::from_millis(env_parsed(
                "SYNC_RETRY_BASE_DELAY_MS",
                defaults.base_delay.as_millis() as u64,
            )),
            max_delay: Duration::from_millis(env_parsed(
                "SYNC_RETRY_MAX_DELAY_MS",
                defaults.max_delay.as_millis() as u64,
            )),
        };

        Ok(Self {
            database_url,
            opensearch_url,
            poll_interval,
            page_size,
            retry,
        })
    }
}

/// Parse an environment variable, falling back to `default` when the
/// variable is unset or unparseable.
fn env_parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<T>().ok())
        .unwrap_or(default)
}

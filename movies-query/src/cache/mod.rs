//! Cache store abstraction and implementations.

pub mod keys;
pub mod redis;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use redis::RedisCache;

/// Errors from the cache backend.
///
/// These never escape a query service read path: a failing cache
/// degrades the request to a direct index read.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The cache backend was unreachable or rejected the command.
    #[error("Cache backend error: {0}")]
    Backend(String),
}

impl CacheError {
    /// Create a backend error.
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

/// A key-value cache with per-entry expiration.
///
/// Values are serialized entities or entity lists. Entries are owned by
/// the query service that wrote them and last-write-wins on concurrent
/// writes; flushing the cache affects freshness only, never correctness.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store `value` under `key` with the given time-to-live.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;
}

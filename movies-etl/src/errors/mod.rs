//! Error types for the sync pipeline.

use thiserror::Error;

use movies_search_repository::SearchIndexError;

/// Errors that can occur while synchronizing one entity kind.
///
/// Every variant is fatal for the current batch only: the driver logs it,
/// leaves the kind's watermark unchanged, and retries the same range on
/// the next cycle.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Extraction from the relational store failed after retries.
    #[error("Extract error: {0}")]
    ExtractError(String),

    /// Loading into the search index failed after retries.
    #[error("Load error: {0}")]
    LoadError(String),

    /// Reading or advancing a sync watermark failed.
    #[error("Watermark error: {0}")]
    WatermarkError(String),
}

impl SyncError {
    /// Create an extract error.
    pub fn extract(msg: impl Into<String>) -> Self {
        Self::ExtractError(msg.into())
    }

    /// Create a load error.
    pub fn load(msg: impl Into<String>) -> Self {
        Self::LoadError(msg.into())
    }

    /// Create a watermark error.
    pub fn watermark(msg: impl Into<String>) -> Self {
        Self::WatermarkError(msg.into())
    }
}

impl From<SearchIndexError> for SyncError {
    fn from(err: SearchIndexError) -> Self {
        Self::LoadError(err.to_string())
    }
}

//! Error types for the query layer.

use thiserror::Error;

use movies_search_repository::SearchIndexError;

/// Errors surfaced to callers of the query services.
///
/// An entity that is simply absent is `Ok(None)`, never an error. Cache
/// failures are handled inside the services (degrade to a direct index
/// read) and do not appear here.
#[derive(Error, Debug)]
pub enum QueryError {
    /// The search index was unavailable or rejected the request.
    #[error("Search index error: {0}")]
    SearchIndex(#[from] SearchIndexError),

    /// A document could not be decoded into its entity type.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl QueryError {
    /// Create a decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }
}

//! OpenSearch backend implementation.

pub mod index_config;
pub mod provider;

pub use provider::OpenSearchProvider;

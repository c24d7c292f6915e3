//! Abstract interfaces for search index backends.

pub mod search_index_provider;

pub use search_index_provider::SearchIndexProvider;

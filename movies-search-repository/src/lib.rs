//! # Movies Search Repository
//!
//! This crate provides traits and implementations for interacting with
//! the search indices. It includes definitions for errors, interfaces,
//! and a concrete implementation for OpenSearch.

pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod types;

pub use errors::SearchIndexError;
pub use interfaces::SearchIndexProvider;
pub use opensearch::OpenSearchProvider;
pub use types::{BulkDocument, PageRequest};

//! # Movies ETL
//!
//! Incremental sync pipeline that keeps the movies search indices
//! consistent with the relational system-of-record.
//!
//! ## Architecture
//!
//! The pipeline follows the Extract-Transform-Load pattern, driven by a
//! polling loop:
//!
//! 1. **Extractor**: reads modified rows from Postgres in bounded pages
//! 2. **Transformer**: maps rows into search documents
//! 3. **Loader**: bulk-upserts documents into the search indices
//! 4. **Sync Driver**: coordinates the flow and advances watermarks
//!
//! ## Modules
//!
//! - [`config`]: Configuration and dependency initialization
//! - [`extractor`]: Paged row extraction from Postgres
//! - [`transformer`]: Row to document mapping
//! - [`loader`]: Bulk upserts with retry
//! - [`watermark`]: Per-kind sync watermark persistence
//! - [`driver`]: The sync loop
//! - [`retry`]: Exponential backoff utility
//! - [`errors`]: Error types for the pipeline

pub mod config;
pub mod driver;
pub mod errors;
pub mod extractor;
pub mod loader;
pub mod retry;
pub mod transformer;
pub mod watermark;

pub use config::Dependencies;
pub use errors::SyncError;

use thiserror::Error;

/// Errors that can occur during pipeline initialization or execution.
#[derive(Error, Debug)]
pub enum EtlError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Sync error.
    #[error("Sync error: {0}")]
    SyncError(#[from] SyncError),
}

impl EtlError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}

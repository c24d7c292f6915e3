//! Request types shared between the provider trait and its callers.

use serde_json::Value;

/// A single document destined for a bulk upsert.
///
/// The source is the already-serialized document body; the id becomes the
/// document `_id`, which is what makes re-sending the same batch an
/// observational no-op (last write wins on identical content).
#[derive(Debug, Clone, PartialEq)]
pub struct BulkDocument {
    pub id: String,
    pub source: Value,
}

impl BulkDocument {
    pub fn new(id: impl Into<String>, source: Value) -> Self {
        Self {
            id: id.into(),
            source,
        }
    }
}

/// A resolved page request against a single index.
///
/// The offset is already absolute (the query layer computes it from its
/// 1-based page number) and the rating floor, when present, restricts
/// results to `rating >= floor`.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub sort_field: String,
    pub sort_descending: bool,
    pub offset: i64,
    pub size: i64,
    pub rating_floor: Option<f64>,
}

//! Document types for the search indices.
//!
//! These structs represent entities as they are stored in the search
//! engine. Identifiers are opaque strings, globally unique and stable
//! across sync cycles. Optional fields use `Option` throughout: an absent
//! rating means "unrated", which is distinct from a rating of zero.

use serde::{Deserialize, Serialize};

/// A lightweight person reference embedded in media documents.
///
/// Resolved during transformation from the denormalized extraction
/// snapshot, not via a live join at query time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonRef {
    pub id: String,
    pub name: String,
}

/// Document representation of a media item (film).
///
/// Carries the full denormalized shape: genre names, participant name
/// lists for full-text search, and nested actor/writer sub-documents for
/// identifier-level lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaDocument {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Rating on a 0-10 scale. `None` means unrated, never zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub directors: Vec<String>,
    #[serde(default)]
    pub actors_names: Vec<String>,
    #[serde(default)]
    pub writers_names: Vec<String>,
    #[serde(default)]
    pub actors: Vec<PersonRef>,
    #[serde(default)]
    pub writers: Vec<PersonRef>,
}

/// Document representation of a person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonDocument {
    pub id: String,
    pub name: String,
    /// Media items this person participated in, by identifier. Purely
    /// informational back-references, not referential integrity.
    #[serde(default)]
    pub media_ids: Vec<String>,
}

/// Document representation of a genre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreDocument {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub media_ids: Vec<String>,
}

impl MediaDocument {
    /// Create a document with only the required fields set.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            rating: None,
            genres: Vec::new(),
            directors: Vec::new(),
            actors_names: Vec::new(),
            writers_names: Vec::new(),
            actors: Vec::new(),
            writers: Vec::new(),
        }
    }
}

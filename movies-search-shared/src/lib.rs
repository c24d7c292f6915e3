//! # Movies Search Shared
//!
//! Shared types for the movies search system: the document shapes stored
//! in the search indices, the entity kinds the pipeline synchronizes, and
//! the listing query parameters used by the query services.

pub mod types;

pub use types::{
    EntityKind, GenreDocument, ListParams, MediaDocument, PersonDocument, PersonRef,
};

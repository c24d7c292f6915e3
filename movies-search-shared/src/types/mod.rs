//! Shared type definitions.

pub mod documents;
pub mod entity_kind;
pub mod list_params;

pub use documents::{GenreDocument, MediaDocument, PersonDocument, PersonRef};
pub use entity_kind::EntityKind;
pub use list_params::ListParams;

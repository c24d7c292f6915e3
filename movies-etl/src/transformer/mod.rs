//! Row to document transformation.
//!
//! Pure mapping, no I/O: the same row always yields the same document,
//! which is what makes re-processing after a crash safe. Optional fields
//! stay optional — an absent rating maps to `None`, never to zero.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use movies_search_repository::BulkDocument;
use movies_search_shared::{GenreDocument, MediaDocument, PersonDocument, PersonRef};

use crate::extractor::{GenreRow, MediaRow, PersonRow, RawRow};

const ROLE_DIRECTOR: &str = "director";
const ROLE_ACTOR: &str = "actor";
const ROLE_WRITER: &str = "writer";

/// One element of the persons JSON aggregation attached to a media row.
#[derive(Debug, Deserialize)]
struct RolePayload {
    person_id: Uuid,
    role: Option<String>,
    full_name: String,
}

/// Errors from transforming a single row.
#[derive(Error, Debug)]
pub enum TransformError {
    /// The persons aggregation on a media row was not valid JSON.
    #[error("Malformed persons payload for row {id}: {source}")]
    MalformedPersons {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    /// Serializing the finished document failed.
    #[error("Serialization error for row {id}: {source}")]
    Serialization {
        id: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Transform a raw row into a bulk document for its kind's index.
pub fn transform(row: &RawRow) -> Result<BulkDocument, TransformError> {
    match row {
        RawRow::Media(row) => transform_media(row),
        RawRow::Person(row) => transform_person(row),
        RawRow::Genre(row) => transform_genre(row),
    }
}

/// Transform a batch, rejecting malformed rows without aborting.
///
/// A row that fails to transform is logged and skipped; the rest of the
/// batch proceeds. The driver still advances the watermark over skipped
/// rows so a permanently malformed row cannot stall its kind.
pub fn transform_batch(rows: &[RawRow]) -> Vec<BulkDocument> {
    rows.iter()
        .filter_map(|row| match transform(row) {
            Ok(document) => Some(document),
            Err(e) => {
                warn!(row_id = %row.id(), error = %e, "Rejected malformed row");
                None
            }
        })
        .collect()
}

fn transform_media(row: &MediaRow) -> Result<BulkDocument, TransformError> {
    let payload: Vec<RolePayload> =
        serde_json::from_str(&row.persons).map_err(|e| TransformError::MalformedPersons {
            id: row.id.to_string(),
            source: e,
        })?;

    let mut doc = MediaDocument {
        id: row.id.to_string(),
        title: row.title.clone(),
        description: row.description.clone(),
        rating: row.rating,
        genres: row.genres.clone(),
        directors: Vec::new(),
        actors_names: Vec::new(),
        writers_names: Vec::new(),
        actors: Vec::new(),
        writers: Vec::new(),
    };

    for person in payload {
        let reference = PersonRef {
            id: person.person_id.to_string(),
            name: person.full_name.clone(),
        };
        match person.role.as_deref() {
            Some(ROLE_DIRECTOR) => doc.directors.push(person.full_name),
            Some(ROLE_ACTOR) => {
                doc.actors_names.push(person.full_name);
                doc.actors.push(reference);
            }
            Some(ROLE_WRITER) => {
                doc.writers_names.push(person.full_name);
                doc.writers.push(reference);
            }
            // Unknown or missing roles carry no searchable field
            _ => {}
        }
    }

    to_bulk(row.id, &doc)
}

fn transform_person(row: &PersonRow) -> Result<BulkDocument, TransformError> {
    let doc = PersonDocument {
        id: row.id.to_string(),
        name: row.full_name.clone(),
        media_ids: row.media_ids.iter().map(Uuid::to_string).collect(),
    };
    to_bulk(row.id, &doc)
}

fn transform_genre(row: &GenreRow) -> Result<BulkDocument, TransformError> {
    let doc = GenreDocument {
        id: row.id.to_string(),
        name: row.name.clone(),
        description: row.description.clone(),
        media_ids: row.media_ids.iter().map(Uuid::to_string).collect(),
    };
    to_bulk(row.id, &doc)
}

fn to_bulk<T: Serialize>(id: Uuid, document: &T) -> Result<BulkDocument, TransformError> {
    let source: Value =
        serde_json::to_value(document).map_err(|e| TransformError::Serialization {
            id: id.to_string(),
            source: e,
        })?;
    Ok(BulkDocument::new(id.to_string(), source))
}

//! Index settings and mappings for the movies search indices.
//!
//! Text fields use a bilingual `ru_en` analyzer (english + russian
//! stopwords and stemmers) so titles and names match in either language.
//! Identifiers and genre names are keyword-typed for exact matching, and
//! sortable name fields carry a `raw` keyword subfield.

use movies_search_shared::EntityKind;
use serde_json::{json, Value};

/// Shared analysis settings for all three indices.
fn analysis_settings() -> Value {
    json!({
        "refresh_interval": "1s",
        "analysis": {
            "filter": {
                "english_stop": {
                    "type": "stop",
                    "stopwords": "_english_"
                },
                "english_stemmer": {
                    "type": "stemmer",
                    "language": "english"
                },
                "english_possessive_stemmer": {
                    "type": "stemmer",
                    "language": "possessive_english"
                },
                "russian_stop": {
                    "type": "stop",
                    "stopwords": "_russian_"
                },
                "russian_stemmer": {
                    "type": "stemmer",
                    "language": "russian"
                }
            },
            "analyzer": {
                "ru_en": {
                    "tokenizer": "standard",
                    "filter": [
                        "lowercase",
                        "english_stop",
                        "english_stemmer",
                        "english_possessive_stemmer",
                        "russian_stop",
                        "russian_stemmer"
                    ]
                }
            }
        }
    })
}

/// A `text` field analyzed with the bilingual analyzer.
fn text_field() -> Value {
    json!({
        "type": "text",
        "analyzer": "ru_en"
    })
}

/// A `text` field with an additional `raw` keyword subfield for sorting.
fn sortable_text_field() -> Value {
    json!({
        "type": "text",
        "analyzer": "ru_en",
        "fields": {
            "raw": {
                "type": "keyword"
            }
        }
    })
}

/// A nested person reference (id + name) sub-document.
fn person_ref_field() -> Value {
    json!({
        "type": "nested",
        "dynamic": "strict",
        "properties": {
            "id": {
                "type": "keyword"
            },
            "name": text_field()
        }
    })
}

/// Get the settings and mappings for one entity kind's index.
pub fn index_settings(kind: EntityKind) -> Value {
    let properties = match kind {
        EntityKind::Media => json!({
            "id": { "type": "keyword" },
            "title": sortable_text_field(),
            "description": text_field(),
            "rating": { "type": "float" },
            "genres": { "type": "keyword" },
            "directors": text_field(),
            "actors_names": text_field(),
            "writers_names": text_field(),
            "actors": person_ref_field(),
            "writers": person_ref_field()
        }),
        EntityKind::Person => json!({
            "id": { "type": "keyword" },
            "name": sortable_text_field(),
            "media_ids": { "type": "keyword" }
        }),
        EntityKind::Genre => json!({
            "id": { "type": "keyword" },
            "name": sortable_text_field(),
            "description": text_field(),
            "media_ids": { "type": "keyword" }
        }),
    };

    json!({
        "settings": analysis_settings(),
        "mappings": {
            "dynamic": "strict",
            "properties": properties
        }
    })
}

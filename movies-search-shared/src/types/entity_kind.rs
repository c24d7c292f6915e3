//! Entity kinds handled by the sync pipeline and query services.

use std::fmt;

/// The three entity kinds kept in the search indices.
///
/// Each kind owns a disjoint index and a disjoint sync watermark, so the
/// pipeline can process kinds independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Media,
    Person,
    Genre,
}

impl EntityKind {
    /// All kinds, in the order the sync driver processes them.
    pub const ALL: [EntityKind; 3] = [EntityKind::Media, EntityKind::Person, EntityKind::Genre];

    /// Name of the search index for this kind.
    pub fn index(&self) -> &'static str {
        match self {
            EntityKind::Media => "movies",
            EntityKind::Person => "persons",
            EntityKind::Genre => "genres",
        }
    }

    /// Field the kind's listings are ranked by.
    ///
    /// Media ranks by rating; person and genre rank by the keyword
    /// subfield of their name (the analyzed text field is not sortable).
    pub fn sort_field(&self) -> &'static str {
        match self {
            EntityKind::Media => "rating",
            EntityKind::Person | EntityKind::Genre => "name.raw",
        }
    }

    /// Stable identifier used for watermark rows and log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Media => "media",
            EntityKind::Person => "person",
            EntityKind::Genre => "genre",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_are_disjoint() {
        let mut names: Vec<&str> = EntityKind::ALL.iter().map(|k| k.index()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 3);
    }

    #[test]
    fn test_sort_fields() {
        assert_eq!(EntityKind::Media.sort_field(), "rating");
        assert_eq!(EntityKind::Person.sort_field(), "name.raw");
        assert_eq!(EntityKind::Genre.sort_field(), "name.raw");
    }
}

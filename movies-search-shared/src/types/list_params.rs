//! Listing query parameters.

use serde::{Deserialize, Serialize};

/// Parameters of a paginated, sorted, optionally filtered listing query.
///
/// Page numbers are 1-based; a page number of zero is treated as the
/// first page. The rating floor only applies to media listings and a
/// floor of zero or below means "unfiltered", so an explicit floor can
/// never hide unrated items behind a sentinel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListParams {
    pub sort_descending: bool,
    pub page_number: u32,
    pub page_size: u32,
    pub rating_floor: Option<f64>,
}

impl ListParams {
    pub fn new(sort_descending: bool, page_number: u32, page_size: u32) -> Self {
        Self {
            sort_descending,
            page_number,
            page_size,
            rating_floor: None,
        }
    }

    pub fn with_rating_floor(mut self, floor: f64) -> Self {
        self.rating_floor = Some(floor);
        self
    }

    /// Result offset for the search engine: `(page_number - 1) * page_size`.
    pub fn offset(&self) -> i64 {
        let page = self.page_number.max(1);
        i64::from(page - 1) * i64::from(self.page_size)
    }

    /// The effective rating floor, with non-positive floors normalized
    /// away (they match everything anyway).
    pub fn effective_rating_floor(&self) -> Option<f64> {
        self.rating_floor.filter(|floor| *floor > 0.0)
    }
}

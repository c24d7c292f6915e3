//! Cache key policy.
//!
//! All cache keys are derived here, nowhere else, so that no two call
//! sites can disagree on the mapping. Single-entity keys are the entity
//! identifier verbatim. Listing keys concatenate, in fixed order, every
//! parameter that affects the result set, separated by `:` — a character
//! that cannot appear in an index name, a float, a direction token or a
//! page number, which makes the mapping injective over parameter tuples.

use movies_search_shared::ListParams;

/// Cache key for a single entity: the identifier verbatim.
pub fn entity_key(id: &str) -> String {
    id.to_string()
}

/// Cache key for a listing query.
///
/// Format: `{index}:list:{rating_floor}:{direction}:{page}:{page_size}`,
/// with `-` standing in for an absent rating floor.
pub fn listing_key(index: &str, params: &ListParams) -> String {
    let floor = match params.rating_floor {
        Some(floor) => floor.to_string(),
        None => "-".to_string(),
    };
    let direction = if params.sort_descending { "desc" } else { "asc" };

    format!(
        "{}:list:{}:{}:{}:{}",
        index, floor, direction, params.page_number, params.page_size
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_entity_key_is_verbatim() {
        assert_eq!(entity_key("abc-123"), "abc-123");
    }

    #[test]
    fn test_listing_key_is_deterministic() {
        let params = ListParams::new(true, 2, 20).with_rating_floor(7.5);
        assert_eq!(
            listing_key("movies", &params),
            listing_key("movies", &params)
        );
        assert_eq!(listing_key("movies", &params), "movies:list:7.5:desc:2:20");
    }

    #[test]
    fn test_distinct_tuples_produce_distinct_keys() {
        let mut keys = HashSet::new();
        let mut count = 0;

        for floor in [None, Some(0.0), Some(7.5), Some(75.0)] {
            for descending in [false, true] {
                for page in [1u32, 2, 12] {
                    for size in [2u32, 21, 50] {
                        let mut params = ListParams::new(descending, page, size);
                        params.rating_floor = floor;
                        keys.insert(listing_key("movies", &params));
                        count += 1;
                    }
                }
            }
        }

        assert_eq!(keys.len(), count);
    }

    #[test]
    fn test_kinds_never_collide() {
        let params = ListParams::new(false, 1, 20);
        assert_ne!(
            listing_key("movies", &params),
            listing_key("genres", &params)
        );
    }

    #[test]
    fn test_absent_floor_differs_from_zero_floor() {
        let absent = ListParams::new(false, 1, 20);
        let zero = ListParams::new(false, 1, 20).with_rating_floor(0.0);
        assert_ne!(listing_key("movies", &absent), listing_key("movies", &zero));
    }

    #[test]
    fn test_adjacent_parameters_do_not_merge() {
        // (page 1, size 22) vs (page 12, size 2) must differ
        let first = ListParams::new(false, 1, 22);
        let second = ListParams::new(false, 12, 2);
        assert_ne!(
            listing_key("movies", &first),
            listing_key("movies", &second)
        );
    }
}

//! Lenient parsing of listing and sampling query strings.
//!
//! Parameters arrive as raw key/value pairs so repeated keys (`muscles=a&muscles=b`)
//! and bracketed keys (`muscles[]=a`) both work. Nothing here rejects a
//! request: bad numbers become defaults and unknown muscle tags never match.

use crate::models::{
    Equipment, ExerciseFilter, Muscle, PageRequest, DEFAULT_LIMIT, DEFAULT_SAMPLE_COUNT,
};

/// Borrowed view over decoded query pairs.
struct QueryPairs<'a>(&'a [(String, String)]);

impl<'a> QueryPairs<'a> {
    /// Non-empty values for `name` or `name[]`, in request order.
    fn values(&self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |(key, _)| key == name || key.strip_suffix("[]") == Some(name))
            .map(|(_, value)| value.trim())
            .filter(|value| !value.is_empty())
    }

    fn first(&self, name: &'a str) -> Option<&'a str> {
        self.values(name).next()
    }

    /// First value parsed as a positive integer, or `default`.
    fn positive_int(&self, name: &'a str, default: u64) -> u64 {
        self.first(name)
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(default)
    }

    fn muscles(&self) -> Option<Vec<Muscle>> {
        let requested: Vec<&str> = self.values("muscles").collect();
        if requested.is_empty() {
            return None;
        }

        let mut muscles = Vec::new();
        for tag in requested {
            match Muscle::from_str(tag) {
                Some(muscle) if !muscles.contains(&muscle) => muscles.push(muscle),
                Some(_) => {}
                None => tracing::debug!("Unknown muscle tag in query: {:?}", tag),
            }
        }
        Some(muscles)
    }

    fn equipment(&self) -> Option<Vec<Equipment>> {
        let mut equipment: Vec<Equipment> = Vec::new();
        for value in self.values("equipment") {
            let value = Equipment::from(value);
            if !equipment.contains(&value) {
                equipment.push(value);
            }
        }
        if equipment.is_empty() {
            None
        } else {
            Some(equipment)
        }
    }
}

/// Inputs to the paginated listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub filter: ExerciseFilter,
    pub page: PageRequest,
}

impl ListParams {
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let query = QueryPairs(pairs);
        let filter = ExerciseFilter {
            muscles: query.muscles(),
            equipment: query.equipment(),
            category: query.first("category").map(str::to_string),
            search: query.first("search").map(str::to_string),
        };
        let page = PageRequest::new(
            query.positive_int("page", 1),
            query.positive_int("limit", DEFAULT_LIMIT),
        );
        Self { filter, page }
    }
}

/// Inputs to the random sample. Category and search are not supported here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomParams {
    pub filter: ExerciseFilter,
    pub count: u64,
}

impl RandomParams {
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let query = QueryPairs(pairs);
        let filter = ExerciseFilter {
            muscles: query.muscles(),
            equipment: query.equipment(),
            ..ExerciseFilter::default()
        };
        Self {
            filter,
            count: query.positive_int("count", DEFAULT_SAMPLE_COUNT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_when_nothing_is_given() {
        let params = ListParams::from_pairs(&[]);
        assert_eq!(params.filter, ExerciseFilter::default());
        assert_eq!(params.page, PageRequest::new(1, DEFAULT_LIMIT));

        let params = RandomParams::from_pairs(&[]);
        assert_eq!(params.count, DEFAULT_SAMPLE_COUNT);
    }

    #[test]
    fn collects_repeated_and_bracketed_keys() {
        let params = ListParams::from_pairs(&pairs(&[
            ("muscles", "chest"),
            ("muscles[]", "triceps"),
            ("equipment", "barbell"),
            ("equipment[]", "dumbbell"),
            ("category", "strength"),
        ]));

        assert_eq!(params.filter.muscles, Some(vec![Muscle::Chest, Muscle::Triceps]));
        assert_eq!(
            params.filter.equipment,
            Some(vec![Equipment::from("barbell"), Equipment::from("dumbbell")])
        );
        assert_eq!(params.filter.category.as_deref(), Some("strength"));
    }

    #[test]
    fn multi_word_muscles_parse() {
        let params = ListParams::from_pairs(&pairs(&[("muscles", "lower back")]));
        assert_eq!(params.filter.muscles, Some(vec![Muscle::LowerBack]));
    }

    #[test]
    fn unknown_muscles_leave_an_unmatchable_filter() {
        let params = ListParams::from_pairs(&pairs(&[("muscles", "wings")]));
        assert_eq!(params.filter.muscles, Some(vec![]));
    }

    #[test]
    fn empty_values_are_ignored() {
        let params = ListParams::from_pairs(&pairs(&[("muscles", ""), ("equipment", " "), ("category", "")]));
        assert_eq!(params.filter, ExerciseFilter::default());
    }

    #[test]
    fn bad_numbers_fall_back_to_defaults() {
        let params = ListParams::from_pairs(&pairs(&[("limit", "abc"), ("page", "-2")]));
        assert_eq!(params.page, PageRequest::new(1, DEFAULT_LIMIT));

        let params = ListParams::from_pairs(&pairs(&[("limit", "0"), ("page", "0")]));
        assert_eq!(params.page, PageRequest::new(1, DEFAULT_LIMIT));

        let params = RandomParams::from_pairs(&pairs(&[("count", "ten")]));
        assert_eq!(params.count, DEFAULT_SAMPLE_COUNT);
    }

    #[test]
    fn limit_has_no_upper_bound() {
        let params = ListParams::from_pairs(&pairs(&[("limit", "100000"), ("page", "3")]));
        assert_eq!(params.page.limit, 100_000);
        assert_eq!(params.page.skip(), 200_000);
    }

    #[test]
    fn random_ignores_category_and_search() {
        let params = RandomParams::from_pairs(&pairs(&[
            ("category", "cardio"),
            ("search", "curl"),
            ("count", "3"),
        ]));
        assert_eq!(params.filter, ExerciseFilter::default());
        assert_eq!(params.count, 3);
    }
}

use serde::{Deserialize, Serialize};

use super::{Equipment, Exercise, Muscle};

/// Default page size for listings.
pub const DEFAULT_LIMIT: u64 = 50;
/// Default number of exercises drawn by a random sample.
pub const DEFAULT_SAMPLE_COUNT: u64 = 10;

/// Constraints on which exercises a query returns.
///
/// Each dimension is optional and `None` matches everything. Dimensions are
/// AND-ed together. A dimension set to `Some` of an empty list matches
/// nothing, which is how a request naming only unknown muscle tags is
/// represented.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExerciseFilter {
    /// Match if any of these appears in primary or secondary muscles.
    pub muscles: Option<Vec<Muscle>>,
    /// Match if the exercise's equipment is one of these.
    pub equipment: Option<Vec<Equipment>>,
    /// Exact category match.
    pub category: Option<String>,
    /// Word-prefix match against the name (full-text index).
    pub search: Option<String>,
}

impl ExerciseFilter {
    pub fn with_muscles(mut self, muscles: impl IntoIterator<Item = Muscle>) -> Self {
        self.muscles = Some(muscles.into_iter().collect());
        self
    }

    pub fn with_equipment<E: Into<Equipment>>(mut self, equipment: impl IntoIterator<Item = E>) -> Self {
        self.equipment = Some(equipment.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Evaluate the muscle, equipment and category dimensions against an
    /// in-memory record. Name search is index-backed and not checked here.
    pub fn matches(&self, exercise: &Exercise) -> bool {
        let muscles_ok = self
            .muscles
            .as_ref()
            .is_none_or(|wanted| wanted.iter().any(|m| exercise.works(*m)));
        let equipment_ok = self
            .equipment
            .as_ref()
            .is_none_or(|wanted| wanted.contains(&exercise.equipment));
        let category_ok = self
            .category
            .as_ref()
            .is_none_or(|c| *c == exercise.category);

        muscles_ok && equipment_ok && category_ok
    }
}

/// A 1-indexed page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    /// Both values must be positive; zero is replaced by the default.
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: if page == 0 { 1 } else { page },
            limit: if limit == 0 { DEFAULT_LIMIT } else { limit },
        }
    }

    /// Records to skip before this page starts.
    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_LIMIT)
    }
}

/// Pagination metadata returned alongside a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub pages: u64,
}

impl Pagination {
    pub fn new(total: u64, request: PageRequest) -> Self {
        Self {
            total,
            page: request.page,
            limit: request.limit,
            pages: total.div_ceil(request.limit),
        }
    }
}

//! Release-year range filter.

use crate::traits::Filter;
use anyhow::Result;
use filters::FilterSet;
use sources::CandidateItem;

/// Keeps candidates released inside `year_range` (inclusive).
/// Undated candidates are kept.
pub struct YearRangeFilter;

impl Filter for YearRangeFilter {
    fn name(&self) -> &str {
        "YearRangeFilter"
    }

    fn apply(&self, candidates: Vec<CandidateItem>, constraints: &FilterSet) -> Result<Vec<CandidateItem>> {
        let Some(range) = constraints.year_range() else {
            return Ok(candidates);
        };

        Ok(candidates
            .into_iter()
            .filter(|candidate| candidate.year.is_none_or(|released| range.contains(released)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filters::{FilterKey, YearRange};

    #[test]
    fn test_year_range_is_inclusive() {
        let constraints = FilterSet::new()
            .with(FilterKey::YearRange, YearRange::new(2015, 2020).unwrap().into())
            .unwrap();
        let candidates = vec![
            CandidateItem::new("Early", "test").with_year(2014),
            CandidateItem::new("Start", "test").with_year(2015),
            CandidateItem::new("End", "test").with_year(2020),
            CandidateItem::new("Late", "test").with_year(2021),
        ];

        let filtered = YearRangeFilter.apply(candidates, &constraints).unwrap();
        let titles: Vec<&str> = filtered.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, ["Start", "End"]);
    }
}

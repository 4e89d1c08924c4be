//! Drops candidates mentioning an excluded term.

use crate::traits::Filter;
use anyhow::Result;
use filters::{FilterKey, FilterSet};
use sources::CandidateItem;

/// Removes candidates whose title, genre or summary contains any
/// `exclude` term (case-insensitive substring match).
pub struct ExclusionFilter;

impl Filter for ExclusionFilter {
    fn name(&self) -> &str {
        "ExclusionFilter"
    }

    fn apply(&self, candidates: Vec<CandidateItem>, constraints: &FilterSet) -> Result<Vec<CandidateItem>> {
        let excluded: Vec<String> = constraints
            .terms(FilterKey::Exclude)
            .iter()
            .map(|term| term.to_lowercase())
            .collect();
        if excluded.is_empty() {
            return Ok(candidates);
        }

        Ok(candidates
            .into_iter()
            .filter(|candidate| {
                let text = candidate.searchable_text();
                !excluded.iter().any(|term| text.contains(term.as_str()))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filters::FilterValue;

    #[test]
    fn test_exclusion_matches_any_field() {
        let constraints = FilterSet::new()
            .with(FilterKey::Exclude, FilterValue::Terms(vec!["Zombie".to_string(), "gore".to_string()]))
            .unwrap();
        let candidates = vec![
            CandidateItem::new("Zombieland", "test"),
            CandidateItem::new("Quiet Place", "test").with_summary("Little gore, lots of tension"),
            CandidateItem::new("Paddington", "test").with_genre("Kids & Family"),
        ];

        let filtered = ExclusionFilter.apply(candidates, &constraints).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].title, "Paddington");
    }
}

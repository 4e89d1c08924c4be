//! Exact release-year filter.

use crate::traits::Filter;
use anyhow::Result;
use filters::FilterSet;
use sources::CandidateItem;

/// Keeps candidates released in the requested `year`.
///
/// Candidates without a known year are kept; the catalog does not always
/// report one.
pub struct ReleaseYearFilter;

impl Filter for ReleaseYearFilter {
    fn name(&self) -> &str {
        "ReleaseYearFilter"
    }

    fn apply(&self, candidates: Vec<CandidateItem>, constraints: &FilterSet) -> Result<Vec<CandidateItem>> {
        let Some(year) = constraints.year() else {
            return Ok(candidates);
        };

        Ok(candidates
            .into_iter()
            .filter(|candidate| candidate.year.is_none_or(|released| released == year))
            .collect())
    }
}

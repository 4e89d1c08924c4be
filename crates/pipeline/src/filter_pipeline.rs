//! The FilterPipeline orchestrates multiple filters.
//!
//! This module provides the main FilterPipeline struct that chains
//! multiple filters together using the builder pattern.

use crate::hard_filters::{ExclusionFilter, GenreMatchFilter, ReleaseYearFilter, YearRangeFilter};
use crate::traits::Filter;
use anyhow::{Context, Result};
use filters::FilterSet;
use sources::CandidateItem;

/// Chains multiple filters together into a processing pipeline.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(ExclusionFilter)
///     .add_filter(ReleaseYearFilter)
///     .add_filter(GenreMatchFilter);
///
/// let filtered = pipeline.apply(candidates, &filters)?;
/// ```
pub struct FilterPipeline {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterPipeline {
    /// Create a new empty FilterPipeline.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Every hard filter the conversation can express, cheapest first.
    pub fn standard() -> Self {
        Self::new()
            .add_filter(ExclusionFilter)
            .add_filter(ReleaseYearFilter)
            .add_filter(YearRangeFilter)
            .add_filter(GenreMatchFilter)
    }

    /// Add a filter to the pipeline (builder pattern).
    pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Apply all filters in sequence to the candidates.
    ///
    /// # Returns
    /// * `Ok(Vec<CandidateItem>)` - The candidates left after all filters, in input order
    /// * `Err` - If any filter fails
    pub fn apply(&self, candidates: Vec<CandidateItem>, constraints: &FilterSet) -> Result<Vec<CandidateItem>> {
        let mut current = candidates;
        for filter in &self.filters {
            tracing::debug!(
                "Applying filter: {} (input count: {})",
                filter.name(),
                current.len()
            );
            current = filter
                .apply(current, constraints)
                .with_context(|| format!("filter {} failed", filter.name()))?;
            tracing::debug!(
                "Filter applied: {} (output count: {})",
                filter.name(),
                current.len()
            );
        }
        Ok(current)
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filters::{FilterKey, FilterValue};

    fn catalog() -> Vec<CandidateItem> {
        vec![
            CandidateItem::new("Scream", "test").with_year(1996).with_genre("Horror"),
            CandidateItem::new("Clueless", "test").with_year(1995).with_genre("Comedy"),
        ]
    }

    #[test]
    fn test_empty_pipeline() {
        let pipeline = FilterPipeline::new();
        let filtered = pipeline.apply(catalog(), &FilterSet::new()).unwrap();
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_single_filter() {
        let constraints = FilterSet::new()
            .with(FilterKey::Exclude, FilterValue::Terms(vec!["horror".to_string()]))
            .unwrap();

        let pipeline = FilterPipeline::new().add_filter(ExclusionFilter);

        let filtered = pipeline.apply(catalog(), &constraints).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].title, "Clueless");
    }

    #[test]
    fn test_standard_pipeline_is_a_no_op_when_unconstrained() {
        let pipeline = FilterPipeline::standard();
        assert_eq!(pipeline.len(), 4);
        assert_eq!(pipeline.apply(catalog(), &FilterSet::new()).unwrap(), catalog());
    }
}

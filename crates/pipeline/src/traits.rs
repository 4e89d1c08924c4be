//! Core traits for the post-search pipeline.
//!
//! This module defines the Filter trait that allows composable,
//! extensible hard filters to be applied to catalog results.

use anyhow::Result;
use filters::FilterSet;
use sources::CandidateItem;

/// Core trait for filtering catalog results.
///
/// All filters must implement this trait to be used in the FilterPipeline.
///
/// ## Design Note
/// - `Send + Sync` allows filters to be shared by concurrent sessions
/// - Filters take ownership of the Vec<CandidateItem> and return a filtered Vec
/// - The catalog can only be biased through a search term, so the
///   conversation's constraints are enforced here, after the search
pub trait Filter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Apply this filter to a set of candidates.
    ///
    /// # Arguments
    /// * `candidates` - The candidates to filter (takes ownership)
    /// * `constraints` - The merged filters in effect for this turn
    fn apply(&self, candidates: Vec<CandidateItem>, constraints: &FilterSet) -> Result<Vec<CandidateItem>>;
}

//! Relevance ranking for filtered candidates.
//!
//! The catalog's own order only reflects the search term, so candidates
//! are re-scored against every constraint in the FilterSet.

use filters::{FilterKey, FilterSet};
use rayon::prelude::*;
use sources::CandidateItem;

/// Scoring weights for each kind of match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelevanceWeights {
    pub include_term: i32,
    pub genre: i32,
    pub actor: i32,
    pub year_mention: i32,
    pub year_nearby: i32,
    pub excluded_term: i32,
    /// Releases after this year earn one point per decade
    pub recency_epoch: u16,
}

impl Default for RelevanceWeights {
    fn default() -> Self {
        Self {
            include_term: 2,
            genre: 2,
            actor: 1,
            year_mention: 1,
            year_nearby: 1,
            excluded_term: -3,
            recency_epoch: 1980,
        }
    }
}

/// Scores candidates in parallel and sorts them by relevance.
#[derive(Debug, Clone, Default)]
pub struct RelevanceScorer {
    weights: RelevanceWeights,
}

impl RelevanceScorer {
    pub fn new(weights: RelevanceWeights) -> Self {
        Self { weights }
    }

    /// Relevance of one candidate under the current constraints.
    pub fn score(&self, candidate: &CandidateItem, constraints: &FilterSet) -> i32 {
        let w = &self.weights;
        let text = candidate.searchable_text();
        let hits = |key: FilterKey| {
            constraints
                .terms(key)
                .iter()
                .filter(|term| text.contains(term.to_lowercase().as_str()))
                .count() as i32
        };

        let mut score = hits(FilterKey::Include) * w.include_term
            + hits(FilterKey::Genres) * w.genre
            + hits(FilterKey::Actors) * w.actor
            + hits(FilterKey::Exclude) * w.excluded_term;

        if let Some(year) = constraints.year() {
            if text.contains(year.to_string().as_str()) {
                score += w.year_mention;
            }
            if candidate.year.is_some_and(|released| released.abs_diff(year) <= 1) {
                score += w.year_nearby;
            }
        }

        if let Some(released) = candidate.year {
            score += i32::from(released.saturating_sub(w.recency_epoch) / 10);
        }

        score
    }

    /// Sort candidates by descending score. Ties keep catalog order.
    pub fn rank(&self, candidates: Vec<CandidateItem>, constraints: &FilterSet) -> Vec<CandidateItem> {
        let scores: Vec<i32> = candidates
            .par_iter()
            .map(|candidate| self.score(candidate, constraints))
            .collect();

        let mut scored: Vec<(i32, CandidateItem)> = scores.into_iter().zip(candidates).collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        tracing::debug!(
            "Ranked {} candidates (top score: {:?})",
            scored.len(),
            scored.first().map(|(score, _)| *score)
        );
        scored.into_iter().map(|(_, candidate)| candidate).collect()
    }
}

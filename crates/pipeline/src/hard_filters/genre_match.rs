//! Loose genre matching against catalog genre labels.

use crate::traits::Filter;
use anyhow::Result;
use filters::{FilterKey, FilterSet};
use sources::CandidateItem;

/// iTunes `primaryGenreName` values and the everyday labels they cover.
const ITUNES_GENRES: &[(&str, &[&str])] = &[
    ("Action & Adventure", &["Action", "Adventure"]),
    ("Comedy", &["Comedy"]),
    ("Documentary", &["Documentary"]),
    ("Drama", &["Drama"]),
    ("Horror", &["Horror"]),
    ("Kids & Family", &["Family"]),
    ("Romance", &["Romance"]),
    ("Sci-Fi & Fantasy", &["Sci-Fi", "Fantasy"]),
    ("Thriller", &["Thriller"]),
    ("Western", &["Western"]),
    ("Independent", &["Indie"]),
    ("Music Documentaries", &["Music", "Documentary"]),
    ("Musicals", &["Music"]),
    ("Sports", &["Sports"]),
];

/// Everyday genre labels for a catalog genre name; empty when unknown.
pub fn common_genres(catalog_genre: &str) -> &'static [&'static str] {
    ITUNES_GENRES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(catalog_genre))
        .map(|(_, labels)| *labels)
        .unwrap_or(&[])
}

/// Keeps candidates matching at least one requested genre, either as a
/// substring of title/genre/summary or through the catalog genre map.
pub struct GenreMatchFilter;

impl GenreMatchFilter {
    fn matches(candidate: &CandidateItem, wanted: &[String]) -> bool {
        let text = candidate.searchable_text();
        if wanted.iter().any(|genre| text.contains(genre.as_str())) {
            return true;
        }

        let mapped = candidate
            .genre
            .as_deref()
            .map(common_genres)
            .unwrap_or(&[])
            .join(" ")
            .to_lowercase();
        wanted.iter().any(|genre| mapped.contains(genre.as_str()))
    }
}

impl Filter for GenreMatchFilter {
    fn name(&self) -> &str {
        "GenreMatchFilter"
    }

    fn apply(&self, candidates: Vec<CandidateItem>, constraints: &FilterSet) -> Result<Vec<CandidateItem>> {
        let wanted: Vec<String> = constraints
            .terms(FilterKey::Genres)
            .iter()
            .map(|genre| genre.to_lowercase())
            .collect();
        if wanted.is_empty() {
            return Ok(candidates);
        }

        Ok(candidates
            .into_iter()
            .filter(|candidate| Self::matches(candidate, &wanted))
            .collect())
    }
}

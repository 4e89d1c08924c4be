//! Core types shared by every catalog source.

use std::sync::Arc;

use async_trait::async_trait;
use filters::FilterSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A movie returned by a catalog search.
///
/// Only `title` and `source` are guaranteed; catalogs fill what they know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateItem {
    pub title: String,
    pub year: Option<u16>,
    pub genre: Option<String>,
    /// Plot summary or long description
    pub summary: Option<String>,
    pub poster_url: Option<String>,
    pub trailer_url: Option<String>,
    /// Catalog-specific identifier (iTunes `trackId`)
    pub catalog_id: Option<u64>,
    /// Which catalog produced the item, e.g. `"iTunes"`
    pub source: String,
}

impl CandidateItem {
    /// Create a bare item with just a title
    pub fn new(title: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            year: None,
            genre: None,
            summary: None,
            poster_url: None,
            trailer_url: None,
            catalog_id: None,
            source: source.into(),
        }
    }

    pub fn with_year(mut self, year: u16) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Lowercased title, genre and summary, used for loose term matching.
    pub fn searchable_text(&self) -> String {
        let mut text = self.title.to_lowercase();
        for part in [&self.genre, &self.summary].into_iter().flatten() {
            text.push(' ');
            text.push_str(&part.to_lowercase());
        }
        text
    }
}

/// Errors raised by a catalog or summary lookup.
///
/// A failed search is never reported as an empty result.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("catalog request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("catalog returned status {0}")]
    Status(u16),

    #[error("could not decode catalog response: {0}")]
    Decode(String),

    #[error("catalog request timed out")]
    Timeout,

    #[error("post-processing failed: {0}")]
    Pipeline(String),
}

impl SearchError {
    /// Classify a transport error, keeping timeouts distinct.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SearchError::Timeout
        } else {
            SearchError::Http(err)
        }
    }
}

/// The search boundary: filters in, ordered candidates out.
#[async_trait]
pub trait CatalogSearch: Send + Sync {
    /// Search the catalog. `Ok(vec![])` means the catalog had no matches.
    async fn search(&self, filters: &FilterSet) -> Result<Vec<CandidateItem>, SearchError>;
}

#[async_trait]
impl<T: CatalogSearch + ?Sized> CatalogSearch for Arc<T> {
    async fn search(&self, filters: &FilterSet) -> Result<Vec<CandidateItem>, SearchError> {
        (**self).search(filters).await
    }
}

/// Looks up a plot summary for a title.
#[async_trait]
pub trait SummaryLookup: Send + Sync {
    /// `Ok(None)` when no summary exists for the title.
    async fn summary(&self, title: &str) -> Result<Option<String>, SearchError>;
}

#[async_trait]
impl<T: SummaryLookup + ?Sized> SummaryLookup for Arc<T> {
    async fn summary(&self, title: &str) -> Result<Option<String>, SearchError> {
        (**self).summary(title).await
    }
}

//! # Sources Crate
//!
//! The search boundary of the movie agent and the catalogs behind it.
//!
//! ## Components
//!
//! ### CatalogSearch
//! The boundary trait: a `FilterSet` goes in, an ordered (possibly empty)
//! list of `CandidateItem`s comes out. A failed search is an error, never
//! an empty list.
//!
//! ### iTunes Source
//! Apple's public search API, no key required:
//! - Filters are folded into a single search term
//! - Posters are upscaled to 600x600
//! - Trailers come from `previewUrl` or a YouTube search link
//!
//! ### Wikipedia Summaries
//! Plot summaries for enrichment, via the REST `page/summary` endpoint.
//!
//! ## Example Usage
//!
//! ```ignore
//! use filters::FilterSet;
//! use sources::{CatalogSearch, ItunesSource};
//!
//! let itunes = ItunesSource::new()?.with_limit(30);
//! let items = itunes.search(&FilterSet::new()).await?;
//! ```

pub mod itunes;
pub mod types;
pub mod wikipedia;

pub use itunes::{ItunesHit, ItunesSource, build_query, youtube_trailer_link};
pub use types::{CandidateItem, CatalogSearch, SearchError, SummaryLookup};
pub use wikipedia::WikipediaSummaries;

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use filters::FilterSet;
    use std::sync::Arc;

    struct Fixed(Vec<CandidateItem>);

    #[async_trait]
    impl CatalogSearch for Fixed {
        async fn search(&self, _filters: &FilterSet) -> Result<Vec<CandidateItem>, SearchError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_search_through_shared_handle() {
        let shared: Arc<dyn CatalogSearch> = Arc::new(Fixed(vec![CandidateItem::new("Heat", "test")]));
        let items = shared.search(&FilterSet::new()).await.unwrap();
        assert_eq!(items[0].title, "Heat");
    }
}

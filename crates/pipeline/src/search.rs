//! Catalog search with local filtering and ranking.

use async_trait::async_trait;
use filters::FilterSet;
use sources::{CandidateItem, CatalogSearch, SearchError};
use tracing::{debug, instrument};

use crate::filter_pipeline::FilterPipeline;
use crate::ranking::RelevanceScorer;

/// Wraps a raw catalog so that results honour every constraint the
/// catalog itself cannot express.
///
/// ## Stages
/// 1. Raw search on the inner catalog
/// 2. Hard filters (exclusions, year, year range, genre)
/// 3. Relevance ranking
pub struct RankedSearch<S> {
    inner: S,
    pipeline: FilterPipeline,
    scorer: RelevanceScorer,
}

impl<S: CatalogSearch> RankedSearch<S> {
    /// Wrap `inner` with the standard pipeline and default weights
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            pipeline: FilterPipeline::standard(),
            scorer: RelevanceScorer::default(),
        }
    }

    pub fn with_pipeline(mut self, pipeline: FilterPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn with_scorer(mut self, scorer: RelevanceScorer) -> Self {
        self.scorer = scorer;
        self
    }
}

#[async_trait]
impl<S: CatalogSearch> CatalogSearch for RankedSearch<S> {
    #[instrument(skip_all, fields(filters = %filters))]
    async fn search(&self, filters: &FilterSet) -> Result<Vec<CandidateItem>, SearchError> {
        let raw = self.inner.search(filters).await?;
        let fetched = raw.len();

        let filtered = self
            .pipeline
            .apply(raw, filters)
            .map_err(|e| SearchError::Pipeline(format!("{e:#}")))?;
        let ranked = self.scorer.rank(filtered, filters);

        debug!("Kept {} of {} catalog hits", ranked.len(), fetched);
        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use filters::{FilterKey, FilterValue};

    struct Fixed(Vec<CandidateItem>);

    #[async_trait]
    impl CatalogSearch for Fixed {
        async fn search(&self, _filters: &FilterSet) -> Result<Vec<CandidateItem>, SearchError> {
            Ok(self.0.clone())
        }
    }

    struct Broken;

    impl crate::Filter for Broken {
        fn name(&self) -> &str {
            "Broken"
        }

        fn apply(&self, _candidates: Vec<CandidateItem>, _constraints: &FilterSet) -> anyhow::Result<Vec<CandidateItem>> {
            Err(anyhow!("boom"))
        }
    }

    #[tokio::test]
    async fn test_pipeline_failure_is_a_search_error() {
        let search = RankedSearch::new(Fixed(vec![CandidateItem::new("Heat", "test")]))
            .with_pipeline(FilterPipeline::new().add_filter(Broken));

        let err = search.search(&FilterSet::new()).await.unwrap_err();
        assert!(matches!(err, SearchError::Pipeline(message) if message.contains("Broken")));
    }

    #[tokio::test]
    async fn test_empty_catalog_stays_empty() {
        let search = RankedSearch::new(Fixed(Vec::new()));
        let filters = FilterSet::new().with(FilterKey::Year, FilterValue::Year(2005)).unwrap();
        assert!(search.search(&filters).await.unwrap().is_empty());
    }
}

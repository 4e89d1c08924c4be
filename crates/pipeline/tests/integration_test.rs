//! Integration tests for the pipeline.
//!
//! These tests verify that filters and ranking work together on a
//! realistic catalog response.

use async_trait::async_trait;
use filters::{FilterParser, FilterSet, TurnCommand, merge};
use pipeline::{FilterPipeline, RankedSearch};
use pipeline::hard_filters::*;
use sources::{CandidateItem, CatalogSearch, SearchError};

/// Catalog stub returning the same hits for every query
struct StubCatalog(Vec<CandidateItem>);

#[async_trait]
impl CatalogSearch for StubCatalog {
    async fn search(&self, _filters: &FilterSet) -> Result<Vec<CandidateItem>, SearchError> {
        Ok(self.0.clone())
    }
}

fn create_test_catalog() -> Vec<CandidateItem> {
    vec![
        CandidateItem::new("The Conjuring", "stub")
            .with_year(2013)
            .with_genre("Horror")
            .with_summary("Paranormal investigators help a family."),
        CandidateItem::new("Crazy Rich Asians", "stub")
            .with_year(2018)
            .with_genre("Romance")
            .with_summary("A romantic comedy about a trip to Singapore."),
        CandidateItem::new("Game Night", "stub")
            .with_year(2018)
            .with_genre("Comedy")
            .with_summary("A game night turns into a real mystery."),
        CandidateItem::new("Superbad", "stub")
            .with_year(2007)
            .with_genre("Comedy")
            .with_summary("Two friends try to enjoy a party."),
        CandidateItem::new("Spy", "stub")
            .with_year(2015)
            .with_genre("Comedy")
            .with_summary("A desk-bound CIA analyst goes undercover."),
    ]
}

fn filters_from(raw: &str) -> FilterSet {
    let outcome = FilterParser::with_current_year(2025).parse(raw);
    merge(&FilterSet::new(), &outcome, TurnCommand::Search)
}

#[tokio::test]
async fn test_full_pipeline() {
    let search = RankedSearch::new(StubCatalog(create_test_catalog()));
    let filters = filters_from(r#"{"genres":["Comedy"],"exclude_terms":["horror"],"year_from":2015,"year_to":2020}"#);

    let items = search.search(&filters).await.unwrap();
    let titles: Vec<&str> = items.iter().map(|c| c.title.as_str()).collect();

    // Superbad is outside the range, The Conjuring is excluded.
    // Game Night and Spy match the genre label; Crazy Rich Asians matches
    // "comedy" in its summary. All three score genre +2 and recency +3.
    assert_eq!(titles, ["Crazy Rich Asians", "Game Night", "Spy"]);
}

#[tokio::test]
async fn test_ranking_prefers_include_terms() {
    let search = RankedSearch::new(StubCatalog(create_test_catalog()));
    let filters = filters_from(r#"{"genres":["Comedy"],"include_terms":["undercover"]}"#);

    let items = search.search(&filters).await.unwrap();
    assert_eq!(items[0].title, "Spy");
    assert_eq!(items.len(), 4);
}

#[tokio::test]
async fn test_unconstrained_search_keeps_everything() {
    let search = RankedSearch::new(StubCatalog(create_test_catalog()));
    let items = search.search(&FilterSet::new()).await.unwrap();
    assert_eq!(items.len(), 5);
}

#[test]
fn test_custom_pipeline_order_does_not_change_result() {
    let filters = filters_from(r#"{"year":2018,"genres":["comedy"]}"#);

    let forward = FilterPipeline::new()
        .add_filter(ReleaseYearFilter)
        .add_filter(GenreMatchFilter);
    let backward = FilterPipeline::new()
        .add_filter(GenreMatchFilter)
        .add_filter(ReleaseYearFilter);

    let a = forward.apply(create_test_catalog(), &filters).unwrap();
    let b = backward.apply(create_test_catalog(), &filters).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.len(), 2);
}

//! Pipeline for filtering and ranking catalog results.
//!
//! This crate provides:
//! - Filter trait and implementations for hard constraints
//! - FilterPipeline for composing filters
//! - RelevanceScorer for ranking what survives
//! - RankedSearch, a `CatalogSearch` adapter that runs all of the above
//!
//! ## Architecture
//! Results are processed in stages:
//! 1. The inner catalog is searched with a term built from the filters
//! 2. Filters remove candidates that break a constraint (excluded term,
//!    wrong year, outside the year range, wrong genre)
//! 3. RelevanceScorer orders the remaining candidates
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::RankedSearch;
//! use sources::{CatalogSearch, ItunesSource};
//!
//! let search = RankedSearch::new(ItunesSource::new()?);
//! let items = search.search(&filters).await?;
//! ```

pub mod filter_pipeline;
pub mod hard_filters;
pub mod ranking;
pub mod search;
pub mod traits;

// Re-export main types
pub use filter_pipeline::FilterPipeline;
pub use ranking::{RelevanceScorer, RelevanceWeights};
pub use search::RankedSearch;
pub use traits::Filter;

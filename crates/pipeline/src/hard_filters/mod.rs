//! Hard filter implementations for the post-search pipeline.
//!
//! Each filter enforces one key of the conversation's FilterSet and is a
//! no-op when that key is unconstrained.

pub mod exclusion;
pub mod genre_match;
pub mod release_year;
pub mod year_range;

// Re-export for convenience
pub use exclusion::ExclusionFilter;
pub use genre_match::{GenreMatchFilter, common_genres};
pub use release_year::ReleaseYearFilter;
pub use year_range::YearRangeFilter;

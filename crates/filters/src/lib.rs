//! # Filters Crate
//!
//! The conversational filter state of the movie agent.
//!
//! ## Main Components
//!
//! - **types**: `FilterKey`, `FilterValue`, `YearRange` and the immutable `FilterSet`
//! - **parser**: turn loosely structured LLM output into a `ParseOutcome`
//! - **merge**: fold a new parse into the running filters (search / refine / restart)
//! - **error**: error types for invalid filter values
//!
//! ## Example Usage
//!
//! ```ignore
//! use filters::{merge, FilterParser, FilterSet, TurnCommand};
//!
//! let parser = FilterParser::new();
//! let outcome = parser.parse(r#"{"query":"romantic comedy","year":2005}"#);
//!
//! let current = merge(&FilterSet::new(), &outcome, TurnCommand::Search);
//! println!("Searching with {}", current.describe());
//! ```

pub mod error;
pub mod merge;
pub mod parser;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{FilterError, Result};
pub use merge::{TurnCommand, merge, replay};
pub use parser::{FilterParser, ParseOutcome};
pub use types::{FIRST_FILM_YEAR, FilterKey, FilterSet, FilterValue, ValueKind, YearRange};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_set_creation() {
        let set = FilterSet::new();
        assert!(set.is_unconstrained());
        assert_eq!(set.len(), 0);
        assert_eq!(set.to_string(), "(none)");
    }

    #[test]
    fn test_parse_then_merge() {
        let parser = FilterParser::with_current_year(2025);
        let outcome = parser.parse(r#"{"query":"romantic comedy","year":2005}"#);
        let merged = merge(&FilterSet::new(), &outcome, TurnCommand::Search);

        assert_eq!(merged.describe(), "query='romantic comedy'; year=2005");
    }
}

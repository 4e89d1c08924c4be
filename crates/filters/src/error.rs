//! Error types for the filters crate.
//!
//! None of these errors ever escape a conversation turn: the parser
//! recovers from each of them by dropping the offending field.

use thiserror::Error;

use crate::types::FilterKey;

/// Errors raised while building or validating a FilterSet
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// A value was outside the range accepted for its key
    /// (e.g. a year before the first motion picture)
    #[error("Invalid value for {key}: {value}")]
    InvalidFilterValue { key: FilterKey, value: String },

    /// A year range whose lower bound is greater than its upper bound
    #[error("Invalid year range: {from} > {to}")]
    InvalidYearRange { from: u16, to: u16 },

    /// The value kind does not fit the key (e.g. a year under `genres`)
    #[error("Value of kind {found} cannot be stored under {key}")]
    KindMismatch { key: FilterKey, found: &'static str },

    /// Key name not in the fixed key set
    #[error("Unknown filter key: {0}")]
    UnknownKey(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, FilterError>;

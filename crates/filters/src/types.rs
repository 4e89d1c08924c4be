//! Core filter types shared by every stage of a conversation.
//!
//! A `FilterSet` is the accumulated set of search constraints. It is a
//! value type: every turn builds a new one, the previous set is never
//! mutated in place, so a conversation can be replayed or logged.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::error::{FilterError, Result};

/// Year of the oldest surviving motion picture; anything earlier is noise.
pub const FIRST_FILM_YEAR: u16 = 1888;

// =============================================================================
// Filter keys
// =============================================================================

/// The fixed set of constraints a conversation can accumulate.
///
/// Ordering matters: it is the order used when rendering a FilterSet and
/// when suggesting dimensions to narrow on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKey {
    Query,
    Year,
    YearRange,
    Genres,
    Actors,
    Directors,
    Language,
    Include,
    Exclude,
}

/// Kind of value a key accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Year,
    YearRange,
    Terms,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Text => "text",
            ValueKind::Year => "year",
            ValueKind::YearRange => "year_range",
            ValueKind::Terms => "terms",
        }
    }
}

impl FilterKey {
    pub const ALL: [FilterKey; 9] = [
        FilterKey::Query,
        FilterKey::Year,
        FilterKey::YearRange,
        FilterKey::Genres,
        FilterKey::Actors,
        FilterKey::Directors,
        FilterKey::Language,
        FilterKey::Include,
        FilterKey::Exclude,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKey::Query => "query",
            FilterKey::Year => "year",
            FilterKey::YearRange => "year_range",
            FilterKey::Genres => "genres",
            FilterKey::Actors => "actors",
            FilterKey::Directors => "directors",
            FilterKey::Language => "language",
            FilterKey::Include => "include",
            FilterKey::Exclude => "exclude",
        }
    }

    /// Resolve a key name as typed by a user or emitted by the model.
    ///
    /// Accepts singular forms and the field names of the extraction
    /// prompt (`exclude_terms`, `year_from`, ...). Case and separators
    /// (`-`, ` `) are ignored.
    pub fn from_name(name: &str) -> Option<FilterKey> {
        let normalized = name.trim().to_lowercase().replace(['-', ' '], "_");
        let key = match normalized.as_str() {
            "query" | "title" | "keywords" => FilterKey::Query,
            "year" => FilterKey::Year,
            "year_range" | "years" | "year_from" | "year_to" | "decade" | "era" => {
                FilterKey::YearRange
            }
            "genre" | "genres" => FilterKey::Genres,
            "actor" | "actors" | "cast" | "star" | "stars" => FilterKey::Actors,
            "director" | "directors" => FilterKey::Directors,
            "language" | "country" | "lang" => FilterKey::Language,
            "include" | "include_terms" | "includes" => FilterKey::Include,
            "exclude" | "exclude_terms" | "exclusions" | "excludes" => FilterKey::Exclude,
            _ => return None,
        };
        Some(key)
    }

    /// Kind of value this key stores
    pub fn kind(&self) -> ValueKind {
        match self {
            FilterKey::Query | FilterKey::Language => ValueKind::Text,
            FilterKey::Year => ValueKind::Year,
            FilterKey::YearRange => ValueKind::YearRange,
            FilterKey::Genres
            | FilterKey::Actors
            | FilterKey::Directors
            | FilterKey::Include
            | FilterKey::Exclude => ValueKind::Terms,
        }
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Values
// =============================================================================

/// Inclusive range of release years. Always `from <= to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct YearRange {
    from: u16,
    to: u16,
}

impl YearRange {
    pub fn new(from: u16, to: u16) -> Result<Self> {
        if from > to {
            return Err(FilterError::InvalidYearRange { from, to });
        }
        Ok(Self { from, to })
    }

    pub fn from(&self) -> u16 {
        self.from
    }

    pub fn to(&self) -> u16 {
        self.to
    }

    pub fn contains(&self, year: u16) -> bool {
        year >= self.from && year <= self.to
    }
}

impl fmt::Display for YearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

/// A single constraint value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    Text(String),
    Year(u16),
    YearRange(YearRange),
    Terms(Vec<String>),
}

impl FilterValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            FilterValue::Text(_) => ValueKind::Text,
            FilterValue::Year(_) => ValueKind::Year,
            FilterValue::YearRange(_) => ValueKind::YearRange,
            FilterValue::Terms(_) => ValueKind::Terms,
        }
    }

    /// Empty text and empty term lists carry no constraint.
    fn is_empty(&self) -> bool {
        match self {
            FilterValue::Text(text) => text.trim().is_empty(),
            FilterValue::Terms(terms) => terms.is_empty(),
            FilterValue::Year(_) | FilterValue::YearRange(_) => false,
        }
    }

    fn normalized(self) -> Self {
        match self {
            FilterValue::Text(text) => FilterValue::Text(text.trim().to_string()),
            FilterValue::Terms(terms) => FilterValue::Terms(normalize_terms(terms)),
            other => other,
        }
    }
}

impl From<YearRange> for FilterValue {
    fn from(range: YearRange) -> Self {
        FilterValue::YearRange(range)
    }
}

/// Trim, drop blanks and remove case-insensitive duplicates, keeping the
/// first spelling seen.
fn normalize_terms(terms: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(terms.len());
    let mut out = Vec::with_capacity(terms.len());
    for term in terms {
        let trimmed = term.trim();
        if trimmed.is_empty() {
            continue;
        }
        let folded = trimmed.to_lowercase();
        if seen.contains(&folded) {
            continue;
        }
        seen.push(folded);
        out.push(trimmed.to_string());
    }
    out
}

// =============================================================================
// FilterSet
// =============================================================================

/// Accumulated search constraints. An absent key means "unconstrained".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FilterSet {
    entries: BTreeMap<FilterKey, FilterValue>,
}

impl FilterSet {
    /// The fully unconstrained set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of this set with `key` constrained to `value`.
    ///
    /// Empty values leave the set unchanged. A value whose kind does not
    /// match the key is rejected.
    pub fn with(&self, key: FilterKey, value: FilterValue) -> Result<Self> {
        if key.kind() != value.kind() {
            return Err(FilterError::KindMismatch {
                key,
                found: value.kind().as_str(),
            });
        }
        let mut next = self.clone();
        let value = value.normalized();
        if !value.is_empty() {
            next.entries.insert(key, value);
        }
        Ok(next)
    }

    /// Returns a copy of this set with `key` unconstrained.
    pub fn without(&self, key: FilterKey) -> Self {
        let mut next = self.clone();
        next.entries.remove(&key);
        next
    }

    pub fn is_unconstrained(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: FilterKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn get(&self, key: FilterKey) -> Option<&FilterValue> {
        self.entries.get(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FilterKey, &FilterValue)> {
        self.entries.iter().map(|(key, value)| (*key, value))
    }

    /// Keys with no constraint, in `FilterKey` order.
    pub fn unconstrained_keys(&self) -> Vec<FilterKey> {
        FilterKey::ALL
            .into_iter()
            .filter(|key| !self.entries.contains_key(key))
            .collect()
    }

    pub fn query(&self) -> Option<&str> {
        self.text(FilterKey::Query)
    }

    pub fn language(&self) -> Option<&str> {
        self.text(FilterKey::Language)
    }

    pub fn year(&self) -> Option<u16> {
        match self.entries.get(&FilterKey::Year) {
            Some(FilterValue::Year(year)) => Some(*year),
            _ => None,
        }
    }

    pub fn year_range(&self) -> Option<YearRange> {
        match self.entries.get(&FilterKey::YearRange) {
            Some(FilterValue::YearRange(range)) => Some(*range),
            _ => None,
        }
    }

    /// Term list stored under `key`; empty when unconstrained or not a
    /// term-valued key.
    pub fn terms(&self, key: FilterKey) -> &[String] {
        match self.entries.get(&key) {
            Some(FilterValue::Terms(terms)) => terms,
            _ => &[],
        }
    }

    fn text(&self, key: FilterKey) -> Option<&str> {
        match self.entries.get(&key) {
            Some(FilterValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// Human readable rendering used in every transport reply.
    ///
    /// `"(none)"` when fully unconstrained.
    pub fn describe(&self) -> String {
        if self.entries.is_empty() {
            return "(none)".to_string();
        }
        self.entries
            .iter()
            .map(|(key, value)| match value {
                FilterValue::Text(text) if *key == FilterKey::Query => {
                    format!("{key}='{text}'")
                }
                FilterValue::Text(text) => format!("{key}={text}"),
                FilterValue::Year(year) => format!("{key}={year}"),
                FilterValue::YearRange(range) => format!("{key}={range}"),
                FilterValue::Terms(terms) => format!("{key}={}", terms.join(", ")),
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl fmt::Display for FilterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_range_rejects_reversed_bounds() {
        assert!(YearRange::new(1990, 1999).is_ok());
        assert!(YearRange::new(2000, 2000).is_ok());
        assert_eq!(
            YearRange::new(2005, 1995),
            Err(FilterError::InvalidYearRange { from: 2005, to: 1995 })
        );
    }

    #[test]
    fn test_with_rejects_kind_mismatch() {
        let result = FilterSet::new().with(FilterKey::Genres, FilterValue::Year(1999));
        assert!(matches!(result, Err(FilterError::KindMismatch { key: FilterKey::Genres, .. })));
    }

    #[test]
    fn test_empty_values_are_not_stored() {
        let set = FilterSet::new()
            .with(FilterKey::Query, FilterValue::Text("   ".to_string()))
            .unwrap()
            .with(FilterKey::Genres, FilterValue::Terms(vec![" ".to_string()]))
            .unwrap();
        assert!(set.is_unconstrained());
    }

    #[test]
    fn test_terms_are_deduplicated() {
        let set = FilterSet::new()
            .with(
                FilterKey::Genres,
                FilterValue::Terms(vec![
                    "Comedy".to_string(),
                    " comedy ".to_string(),
                    "Romance".to_string(),
                ]),
            )
            .unwrap();
        assert_eq!(set.terms(FilterKey::Genres), &["Comedy", "Romance"]);
    }

    #[test]
    fn test_describe_unconstrained() {
        assert_eq!(FilterSet::new().describe(), "(none)");
    }

    #[test]
    fn test_describe_renders_in_key_order() {
        let set = FilterSet::new()
            .with(FilterKey::Exclude, FilterValue::Terms(vec!["horror".to_string()]))
            .unwrap()
            .with(FilterKey::Year, FilterValue::Year(1999))
            .unwrap()
            .with(FilterKey::Query, FilterValue::Text("comedy".to_string()))
            .unwrap()
            .with(FilterKey::YearRange, FilterValue::YearRange(YearRange::new(1990, 1999).unwrap()))
            .unwrap();

        assert_eq!(
            set.describe(),
            "query='comedy'; year=1999; year_range=1990-1999; exclude=horror"
        );
    }

    #[test]
    fn test_key_aliases() {
        assert_eq!(FilterKey::from_name("Genre"), Some(FilterKey::Genres));
        assert_eq!(FilterKey::from_name("exclude_terms"), Some(FilterKey::Exclude));
        assert_eq!(FilterKey::from_name("year-from"), Some(FilterKey::YearRange));
        assert_eq!(FilterKey::from_name("country"), Some(FilterKey::Language));
        assert_eq!(FilterKey::from_name("mood"), None);
    }

    #[test]
    fn test_unconstrained_keys_follow_key_order() {
        let set = FilterSet::new()
            .with(FilterKey::Query, FilterValue::Text("disney".to_string()))
            .unwrap();
        let open = set.unconstrained_keys();
        assert_eq!(open.first(), Some(&FilterKey::Year));
        assert!(!open.contains(&FilterKey::Query));
        assert_eq!(open.len(), FilterKey::ALL.len() - 1);
    }
}

//! Parser for LLM filter-extraction output.
//!
//! The model is asked for minified JSON, but small local models wrap it
//! in code fences, truncate it, or answer in prose. Parsing therefore
//! runs in two stages:
//! 1. structured decoding of the first JSON object in the text
//! 2. a regex fallback that picks `key: value` pairs, year ranges,
//!    decades, single years, `no <term>` exclusions and `clear <key>`
//!    instructions out of whatever text came back
//!
//! Bad values are dropped field by field. The parser never fails; when
//! nothing usable is found the outcome has `ok == false`.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use chrono::{Datelike, Utc};
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{FilterError, Result};
use crate::types::{FIRST_FILM_YEAR, FilterKey, FilterSet, FilterValue, ValueKind, YearRange};

static PAIR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)"?\b(query|title|year_range|year_from|year_to|years|year|decade|genres?|actors?|cast|directors?|language|country|include_terms|include|exclude_terms|exclude|exclusions)\b"?\s*[:=]\s*("[^"]*"|\[[^\]]*\]|[^,;\n}]+)"#,
    )
    .expect("pair pattern is valid")
});

static RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(1[89]\d{2}|20\d{2})\s*(?:-|–|to|through|until)\s*(1[89]\d{2}|20\d{2})\b")
        .expect("range pattern is valid")
});

static DECADE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:(1[89]|20)(\d)0|(\d)0)'?s\b").expect("decade pattern is valid")
});

static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(1[89]\d{2}|20\d{2})\b").expect("year pattern is valid"));

static CLEAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:clear|remove|drop|reset)\s+(?:the\s+)?([a-z_-]+)(?:\s+filters?)?")
        .expect("clear pattern is valid")
});

static EXCLUDE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:no|without|excluding)\s+([a-z][a-z'-]+)").expect("exclude pattern is valid")
});

/// Words after "no"/"without" that never name an excluded term.
/// Filter key names are skipped as well.
const EXCLUDE_STOPWORDS: &[&str] = &[
    "a", "an", "any", "the", "more", "other", "filter", "filters", "idea", "specific",
];

static FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^```[a-zA-Z]*\s*").expect("fence pattern is valid"));

/// Result of parsing one model response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseOutcome {
    /// Constraints stated in this turn only
    pub filters: FilterSet,
    /// Keys the text explicitly asked to clear
    pub cleared: BTreeSet<FilterKey>,
    /// False when no usable signal was found at all
    pub ok: bool,
}

impl ParseOutcome {
    /// Outcome for a turn that produced no signal (failed or skipped call).
    pub fn empty() -> Self {
        Self::default()
    }

    fn new(filters: FilterSet, cleared: BTreeSet<FilterKey>) -> Self {
        let ok = !filters.is_unconstrained() || !cleared.is_empty();
        Self { filters, cleared, ok }
    }

    /// Adds clear instructions gathered outside the model response.
    pub fn with_cleared(mut self, keys: impl IntoIterator<Item = FilterKey>) -> Self {
        self.cleared.extend(keys);
        self.ok = !self.filters.is_unconstrained() || !self.cleared.is_empty();
        self
    }
}

/// Converts raw model text into a [`ParseOutcome`].
#[derive(Debug, Clone)]
pub struct FilterParser {
    max_year: u16,
}

impl FilterParser {
    /// Parser accepting years up to next year.
    pub fn new() -> Self {
        let current_year = u16::try_from(Utc::now().year()).unwrap_or(u16::MAX - 1);
        Self::with_current_year(current_year)
    }

    /// Parser with a fixed notion of "now"; years above `current_year + 1`
    /// are rejected.
    pub fn with_current_year(current_year: u16) -> Self {
        Self {
            max_year: current_year.saturating_add(1),
        }
    }

    pub fn max_year(&self) -> u16 {
        self.max_year
    }

    /// Parse model output. Never fails.
    pub fn parse(&self, raw_text: &str) -> ParseOutcome {
        let text = strip_code_fence(raw_text);
        if text.is_empty() {
            return ParseOutcome::empty();
        }

        if let Some(outcome) = self.parse_structured(&text) {
            debug!(filters = %outcome.filters, ok = outcome.ok, "Decoded structured filters");
            return outcome;
        }

        let outcome = self.parse_heuristic(&text);
        debug!(filters = %outcome.filters, ok = outcome.ok, "Extracted filters heuristically");
        outcome
    }

    /// Pull `clear <key>` instructions out of user text.
    ///
    /// Returns the recognised keys and the text with those instructions
    /// removed, so the remainder can still go to the model.
    pub fn extract_clears(&self, text: &str) -> (BTreeSet<FilterKey>, String) {
        let mut cleared = BTreeSet::new();
        let mut remainder = String::with_capacity(text.len());
        let mut last = 0;
        for caps in CLEAR_RE.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            let Some(key) = caps.get(1).and_then(|m| FilterKey::from_name(m.as_str())) else {
                continue;
            };
            cleared.insert(key);
            remainder.push_str(&text[last..whole.start()]);
            last = whole.end();
        }
        remainder.push_str(&text[last..]);

        let remainder = remainder
            .split([',', ';'])
            .map(str::trim)
            .filter(|part| !part.is_empty() && !part.eq_ignore_ascii_case("and"))
            .collect::<Vec<_>>()
            .join(", ");
        (cleared, remainder)
    }

    // -------------------------------------------------------------------------
    // Structured decoding
    // -------------------------------------------------------------------------

    fn parse_structured(&self, text: &str) -> Option<ParseOutcome> {
        let object = decode_object(text)?;

        let mut filters = FilterSet::new();
        let mut cleared = BTreeSet::new();
        let mut year_from = None;
        let mut year_to = None;

        for (name, value) in &object {
            let lowered = name.to_lowercase();
            match lowered.as_str() {
                "clear" | "cleared" | "clear_keys" => {
                    cleared.extend(clear_keys(value));
                    continue;
                }
                "year_from" => {
                    year_from = self.year_from_json(value).ok().flatten();
                    continue;
                }
                "year_to" => {
                    year_to = self.year_from_json(value).ok().flatten();
                    continue;
                }
                _ => {}
            }

            let Some(key) = FilterKey::from_name(&lowered) else {
                continue;
            };
            filters = constrain(filters, key, self.value_from_json(key, value));
        }

        if !filters.contains(FilterKey::YearRange) {
            if let Some(range) = self.open_range(year_from, year_to) {
                filters = constrain(filters, FilterKey::YearRange, range.map(Some));
            }
        }

        Some(ParseOutcome::new(filters, cleared))
    }

    // -------------------------------------------------------------------------
    // Heuristic fallback
    // -------------------------------------------------------------------------

    fn parse_heuristic(&self, text: &str) -> ParseOutcome {
        let mut filters = FilterSet::new();
        let mut year_from = None;
        let mut year_to = None;

        for caps in PAIR_RE.captures_iter(text) {
            let (Some(name), Some(raw)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            let name = name.as_str().to_lowercase();
            let value = loose_value(raw.as_str());
            match name.as_str() {
                "year_from" => year_from = self.year_from_json(&value).ok().flatten(),
                "year_to" => year_to = self.year_from_json(&value).ok().flatten(),
                _ => {
                    if let Some(key) = FilterKey::from_name(&name) {
                        if !filters.contains(key) {
                            filters = constrain(filters, key, self.value_from_json(key, &value));
                        }
                    }
                }
            }
        }

        if !filters.contains(FilterKey::YearRange) {
            let range = match self.open_range(year_from, year_to) {
                Some(range) => Some(range),
                None => self.range_from_text(text).map(Ok),
            };
            if let Some(range) = range {
                filters = constrain(filters, FilterKey::YearRange, range.map(Some));
            }
        }

        if !filters.contains(FilterKey::Year) && !filters.contains(FilterKey::YearRange) {
            let year = YEAR_RE
                .captures_iter(text)
                .filter_map(|caps| caps.get(1))
                .find_map(|m| self.checked_year(m.as_str().parse().ok()?).ok());
            if let Some(year) = year {
                filters = constrain(filters, FilterKey::Year, Ok(Some(FilterValue::Year(year))));
            }
        }

        if !filters.contains(FilterKey::Exclude) {
            let excluded: Vec<String> = EXCLUDE_RE
                .captures_iter(text)
                .filter_map(|caps| caps.get(1))
                .map(|m| m.as_str().to_lowercase())
                .filter(|term| !EXCLUDE_STOPWORDS.contains(&term.as_str()))
                .filter(|term| FilterKey::from_name(term).is_none())
                .collect();
            if !excluded.is_empty() {
                filters = constrain(filters, FilterKey::Exclude, Ok(Some(FilterValue::Terms(excluded))));
            }
        }

        let (cleared, _) = self.extract_clears(text);
        ParseOutcome::new(filters, cleared)
    }

    // -------------------------------------------------------------------------
    // Value coercion
    // -------------------------------------------------------------------------

    /// Coerce a JSON value into the kind `key` stores. `Ok(None)` means
    /// "nothing stated" (null, empty string, empty list).
    fn value_from_json(&self, key: FilterKey, value: &Value) -> Result<Option<FilterValue>> {
        if value.is_null() {
            return Ok(None);
        }
        let coerced = match key.kind() {
            ValueKind::Text => scalar_text(value).map(FilterValue::Text),
            ValueKind::Terms => {
                let terms = terms_from_json(value);
                (!terms.is_empty()).then_some(FilterValue::Terms(terms))
            }
            ValueKind::Year => self.year_from_json(value)?.map(FilterValue::Year),
            ValueKind::YearRange => self.range_from_json(value)?.map(FilterValue::YearRange),
        };
        Ok(coerced)
    }

    fn year_from_json(&self, value: &Value) -> Result<Option<u16>> {
        let year = match value {
            Value::Null => return Ok(None),
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Value::String(s) if s.trim().is_empty() => return Ok(None),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        match year {
            Some(year) => self.checked_year(year).map(Some),
            None => Err(FilterError::InvalidFilterValue {
                key: FilterKey::Year,
                value: value.to_string(),
            }),
        }
    }

    fn range_from_json(&self, value: &Value) -> Result<Option<YearRange>> {
        match value {
            Value::Array(bounds) if bounds.len() == 2 => {
                let from = self.year_from_json(&bounds[0])?;
                let to = self.year_from_json(&bounds[1])?;
                self.open_range(from, to).transpose()
            }
            Value::Object(bounds) => {
                let bound = |names: &[&str]| -> Result<Option<u16>> {
                    match names.iter().find_map(|name| bounds.get(*name)) {
                        Some(v) => self.year_from_json(v),
                        None => Ok(None),
                    }
                };
                let from = bound(&["from", "start", "year_from", "min"])?;
                let to = bound(&["to", "end", "year_to", "max"])?;
                self.open_range(from, to).transpose()
            }
            Value::String(s) => match self.range_from_text(s) {
                Some(range) => Ok(Some(range)),
                None => Err(FilterError::InvalidFilterValue {
                    key: FilterKey::YearRange,
                    value: s.clone(),
                }),
            },
            Value::Number(_) => {
                let year = self.year_from_json(value)?;
                self.open_range(year, year).transpose()
            }
            other => Err(FilterError::InvalidFilterValue {
                key: FilterKey::YearRange,
                value: other.to_string(),
            }),
        }
    }

    /// Explicit range first, then a decade.
    fn range_from_text(&self, text: &str) -> Option<YearRange> {
        if let Some(caps) = RANGE_RE.captures(text) {
            let from = caps.get(1)?.as_str().parse::<i64>().ok()?;
            let to = caps.get(2)?.as_str().parse::<i64>().ok()?;
            let from = self.checked_year(from).ok()?;
            let to = self.checked_year(to).ok()?;
            return YearRange::new(from, to).ok();
        }

        let caps = DECADE_RE.captures(text)?;
        let start = match (caps.get(1), caps.get(2), caps.get(3)) {
            (Some(century), Some(decade), _) => {
                century.as_str().parse::<u16>().ok()? * 100 + decade.as_str().parse::<u16>().ok()? * 10
            }
            (_, _, Some(decade)) => {
                let decade = decade.as_str().parse::<u16>().ok()?;
                // "20s" is ambiguous; short decades up to the current one are
                // read as this century
                let this_century = 2000 + decade * 10;
                if this_century <= self.max_year {
                    this_century
                } else {
                    1900 + decade * 10
                }
            }
            _ => return None,
        };
        let start = self.checked_year(i64::from(start)).ok()?;
        YearRange::new(start, (start + 9).min(self.max_year)).ok()
    }

    /// Build a range from optional bounds; a missing bound is open-ended.
    fn open_range(&self, from: Option<u16>, to: Option<u16>) -> Option<Result<YearRange>> {
        match (from, to) {
            (None, None) => None,
            (Some(from), Some(to)) => Some(YearRange::new(from, to)),
            (Some(from), None) => Some(YearRange::new(from, self.max_year)),
            (None, Some(to)) => Some(YearRange::new(FIRST_FILM_YEAR, to)),
        }
    }

    fn checked_year(&self, year: i64) -> Result<u16> {
        if year < i64::from(FIRST_FILM_YEAR) || year > i64::from(self.max_year) {
            return Err(FilterError::InvalidFilterValue {
                key: FilterKey::Year,
                value: year.to_string(),
            });
        }
        Ok(year as u16)
    }
}

impl Default for FilterParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply one coerced value, dropping it (with a debug log) when invalid.
fn constrain(
    filters: FilterSet,
    key: FilterKey,
    value: Result<Option<impl Into<FilterValue>>>,
) -> FilterSet {
    let value = match value {
        Ok(Some(value)) => value.into(),
        Ok(None) => return filters,
        Err(err) => {
            debug!(%key, error = %err, "Discarding filter value");
            return filters;
        }
    };
    match filters.with(key, value) {
        Ok(next) => next,
        Err(err) => {
            debug!(%key, error = %err, "Discarding filter value");
            filters
        }
    }
}

fn strip_code_fence(raw: &str) -> String {
    let trimmed = raw.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }
    let without_open = FENCE_RE.replace(trimmed, "");
    without_open
        .trim_end()
        .trim_end_matches("```")
        .trim()
        .to_string()
}

/// Decode the whole text as a JSON object, or else the outermost
/// `{ ... }` span inside it.
fn decode_object(text: &str) -> Option<Map<String, Value>> {
    if let Ok(Value::Object(object)) = serde_json::from_str::<Value>(text) {
        return Some(object);
    }
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str::<Value>(&text[start..=end]) {
        Ok(Value::Object(object)) => Some(object),
        _ => None,
    }
}

/// Interpret the raw right-hand side of a `key: value` pair.
fn loose_value(raw: &str) -> Value {
    let raw = raw.trim();
    if raw.starts_with('[') {
        if let Ok(value) = serde_json::from_str::<Value>(raw) {
            return value;
        }
        let inner = raw.trim_start_matches('[').trim_end_matches(']');
        return Value::Array(
            inner
                .split(',')
                .map(|part| Value::String(part.trim().trim_matches('"').to_string()))
                .collect(),
        );
    }
    if let Some(inner) = raw.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        return Value::String(inner.to_string());
    }
    if raw.eq_ignore_ascii_case("null") || raw.eq_ignore_ascii_case("none") {
        return Value::Null;
    }
    if let Ok(number) = raw.parse::<i64>() {
        return Value::from(number);
    }
    Value::String(raw.trim_matches('"').to_string())
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn terms_from_json(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(scalar_text).collect(),
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn clear_keys(value: &Value) -> Vec<FilterKey> {
    terms_from_json(value)
        .iter()
        .filter_map(|name| FilterKey::from_name(name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> FilterParser {
        FilterParser::with_current_year(2025)
    }

    #[test]
    fn test_parse_minified_json() {
        let outcome = parser().parse(r#"{"query":"romantic comedy","year":2005}"#);
        assert!(outcome.ok);
        assert_eq!(outcome.filters.query(), Some("romantic comedy"));
        assert_eq!(outcome.filters.year(), Some(2005));
        assert_eq!(outcome.filters.len(), 2);
    }

    #[test]
    fn test_parse_full_extraction_schema() {
        let raw = r#"{"query":"space","include_terms":["funny"],"exclude_terms":["horror"],
            "genres":["Sci-Fi","Comedy"],"actors":[],"directors":["Nolan"],"year":null,
            "year_from":1990,"year_to":1999,"country":"US"}"#;
        let outcome = parser().parse(raw);

        assert!(outcome.ok);
        let f = &outcome.filters;
        assert_eq!(f.query(), Some("space"));
        assert_eq!(f.terms(FilterKey::Include), &["funny"]);
        assert_eq!(f.terms(FilterKey::Exclude), &["horror"]);
        assert_eq!(f.terms(FilterKey::Genres), &["Sci-Fi", "Comedy"]);
        assert_eq!(f.terms(FilterKey::Directors), &["Nolan"]);
        assert!(!f.contains(FilterKey::Actors), "empty list means unconstrained");
        assert!(!f.contains(FilterKey::Year), "null means unconstrained");
        assert_eq!(f.year_range(), Some(YearRange::new(1990, 1999).unwrap()));
        assert_eq!(f.language(), Some("US"));
    }

    #[test]
    fn test_parse_code_fenced_json() {
        let raw = "```json\n{\"genres\": [\"Horror\"]}\n```";
        let outcome = parser().parse(raw);
        assert!(outcome.ok);
        assert_eq!(outcome.filters.terms(FilterKey::Genres), &["Horror"]);
    }

    #[test]
    fn test_parse_json_wrapped_in_prose() {
        let raw = "Sure! Here are the filters: {\"query\": \"heist\"} Hope that helps.";
        let outcome = parser().parse(raw);
        assert_eq!(outcome.filters.query(), Some("heist"));
    }

    #[test]
    fn test_parse_truncated_json_falls_back_to_pairs() {
        let raw = r#"{"query": "romantic comedy", "year": 2005, "genres": ["Rom"#;
        let outcome = parser().parse(raw);
        assert!(outcome.ok);
        assert_eq!(outcome.filters.query(), Some("romantic comedy"));
        assert_eq!(outcome.filters.year(), Some(2005));
    }

    #[test]
    fn test_parse_key_value_lines() {
        let raw = "genre: thriller\nactor: Leonardo DiCaprio\nyears: 2010 to 2015";
        let outcome = parser().parse(raw);
        assert_eq!(outcome.filters.terms(FilterKey::Genres), &["thriller"]);
        assert_eq!(outcome.filters.terms(FilterKey::Actors), &["Leonardo DiCaprio"]);
        assert_eq!(
            outcome.filters.year_range(),
            Some(YearRange::new(2010, 2015).unwrap())
        );
    }

    #[test]
    fn test_parse_decade_in_prose() {
        let outcome = parser().parse("I think they want something from the 90s");
        assert_eq!(
            outcome.filters.year_range(),
            Some(YearRange::new(1990, 1999).unwrap())
        );
        assert!(!outcome.filters.contains(FilterKey::Year));
    }

    #[test]
    fn test_parse_exclusions_in_prose() {
        let outcome = parser().parse("comedies from 2015-2020, no horror and without gore");
        assert_eq!(outcome.filters.terms(FilterKey::Exclude), &["horror", "gore"]);
        assert_eq!(
            outcome.filters.year_range(),
            Some(YearRange::new(2015, 2020).unwrap())
        );

        let outcome = parser().parse("I have no idea what they want");
        assert!(!outcome.ok);
    }

    #[test]
    fn test_key_names_are_not_exclusions() {
        let outcome = parser().parse("Heist movies, no year was given and without genre. No horror.");
        assert_eq!(outcome.filters.terms(FilterKey::Exclude), &["horror"]);

        let outcome = parser().parse("no actors, without language");
        assert!(!outcome.filters.contains(FilterKey::Exclude));
    }

    #[test]
    fn test_garbage_is_not_ok() {
        for raw in ["", "   ", "xyzzy nonsense", "I'm not sure what you mean.", "{}", "[1, 2]"] {
            let outcome = parser().parse(raw);
            assert!(!outcome.ok, "expected no signal from {raw:?}");
            assert!(outcome.filters.is_unconstrained());
        }
    }

    #[test]
    fn test_all_null_json_is_not_ok() {
        let outcome = parser().parse(r#"{"query": null, "genres": [], "year": null}"#);
        assert!(!outcome.ok);
    }

    #[test]
    fn test_out_of_range_year_is_discarded() {
        let outcome = parser().parse(r#"{"query": "silent film", "year": 1850}"#);
        assert!(outcome.ok);
        assert_eq!(outcome.filters.query(), Some("silent film"));
        assert_eq!(outcome.filters.year(), None);

        let outcome = parser().parse(r#"{"year": 2027}"#);
        assert!(!outcome.ok, "year past current+1 is dropped");

        let outcome = parser().parse(r#"{"year": 2026}"#);
        assert_eq!(outcome.filters.year(), Some(2026));
    }

    #[test]
    fn test_reversed_range_is_discarded() {
        let outcome = parser().parse(r#"{"query":"war","year_from":2010,"year_to":1990}"#);
        assert!(outcome.ok);
        assert_eq!(outcome.filters.year_range(), None);
    }

    #[test]
    fn test_open_ended_range() {
        let outcome = parser().parse(r#"{"year_from": 2015}"#);
        assert_eq!(
            outcome.filters.year_range(),
            Some(YearRange::new(2015, 2026).unwrap())
        );
        let outcome = parser().parse(r#"{"year_to": 1960}"#);
        assert_eq!(
            outcome.filters.year_range(),
            Some(YearRange::new(FIRST_FILM_YEAR, 1960).unwrap())
        );
    }

    #[test]
    fn test_wrong_kind_is_discarded() {
        let outcome = parser().parse(r#"{"year": "nineteen ninety", "genres": "Drama"}"#);
        assert_eq!(outcome.filters.year(), None);
        assert_eq!(outcome.filters.terms(FilterKey::Genres), &["Drama"]);
    }

    #[test]
    fn test_clear_field_in_json() {
        let outcome = parser().parse(r#"{"clear": ["genre", "bogus"]}"#);
        assert!(outcome.ok);
        assert!(outcome.filters.is_unconstrained());
        assert_eq!(outcome.cleared, BTreeSet::from([FilterKey::Genres]));
    }

    #[test]
    fn test_extract_clears_from_user_text() {
        let (cleared, remainder) = parser().extract_clears("clear genre, only from 2010");
        assert_eq!(cleared, BTreeSet::from([FilterKey::Genres]));
        assert_eq!(remainder, "only from 2010");

        let (cleared, remainder) = parser().extract_clears("clear genre");
        assert_eq!(cleared, BTreeSet::from([FilterKey::Genres]));
        assert!(remainder.is_empty());

        let (cleared, remainder) = parser().extract_clears("remove the actor filter and clear year");
        assert_eq!(cleared, BTreeSet::from([FilterKey::Actors, FilterKey::Year]));
        assert!(remainder.is_empty());
    }

    #[test]
    fn test_with_cleared_sets_ok() {
        let outcome = ParseOutcome::empty().with_cleared([FilterKey::Genres]);
        assert!(outcome.ok);
    }
}

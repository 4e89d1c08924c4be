//! iTunes Source - Apple's public movie catalog
//!
//! Searches `https://itunes.apple.com/search` (no API key) and maps each
//! hit to a [`CandidateItem`].
//!
//! ## Algorithm
//! 1. Fold the filters into one search term (the API has no structured
//!    filters, only a free-text term)
//! 2. Query with `media=movie`, `entity=movie`, `attribute=movieTerm`
//! 3. Map hits: year from `releaseDate`, poster upscaled to 600x600,
//!    trailer from `previewUrl` or a YouTube search link
//!
//! Hard filtering and ranking of the hits happen in the `pipeline` crate.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use filters::{FIRST_FILM_YEAR, FilterKey, FilterSet};
use regex::Regex;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::types::{CandidateItem, CatalogSearch, SearchError};

pub const ITUNES_SEARCH_URL: &str = "https://itunes.apple.com/search";
pub const DEFAULT_LIMIT: u32 = 30;
/// Largest page the API serves
pub const MAX_LIMIT: u32 = 200;
pub const DEFAULT_COUNTRY: &str = "US";
pub const SOURCE_LABEL: &str = "iTunes";

const FALLBACK_TERM: &str = "popular movies";
const YOUTUBE_RESULTS_URL: &str = "https://www.youtube.com/results";

static ARTWORK_SIZE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+x\d+bb\.jpg").expect("artwork pattern is valid"));

/// One entry of the iTunes `results` array. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItunesHit {
    #[serde(rename = "trackName")]
    pub track_name: Option<String>,
    #[serde(rename = "collectionName")]
    pub collection_name: Option<String>,
    #[serde(rename = "releaseDate")]
    pub release_date: Option<String>,
    #[serde(rename = "primaryGenreName")]
    pub primary_genre_name: Option<String>,
    #[serde(rename = "longDescription")]
    pub long_description: Option<String>,
    #[serde(rename = "shortDescription")]
    pub short_description: Option<String>,
    #[serde(rename = "artworkUrl100")]
    pub artwork_url_100: Option<String>,
    #[serde(rename = "artworkUrl60")]
    pub artwork_url_60: Option<String>,
    #[serde(rename = "previewUrl")]
    pub preview_url: Option<String>,
    #[serde(rename = "trackId")]
    pub track_id: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ItunesResponse {
    #[serde(default)]
    results: Vec<ItunesHit>,
}

impl ItunesHit {
    /// Convert to a candidate; hits without any title are dropped.
    pub fn into_candidate(self) -> Option<CandidateItem> {
        let title = non_blank(self.track_name).or_else(|| non_blank(self.collection_name))?;
        let year = self
            .release_date
            .as_deref()
            .and_then(|date| date.get(..4))
            .and_then(|year| year.parse::<u16>().ok());
        let poster_url = non_blank(self.artwork_url_100)
            .or_else(|| non_blank(self.artwork_url_60))
            .map(|url| upscale_artwork(&url));
        let trailer_url =
            non_blank(self.preview_url).unwrap_or_else(|| youtube_trailer_link(&title, year));

        Some(CandidateItem {
            year,
            genre: non_blank(self.primary_genre_name),
            summary: non_blank(self.long_description).or_else(|| non_blank(self.short_description)),
            poster_url,
            trailer_url: Some(trailer_url),
            catalog_id: self.track_id,
            source: SOURCE_LABEL.to_string(),
            title,
        })
    }
}

/// iTunes catalog search
pub struct ItunesSource {
    http: Client,
    endpoint: String,
    country: String,
    limit: u32,
}

impl ItunesSource {
    /// Create a source with its own HTTP client (15s timeout)
    pub fn new() -> Result<Self, SearchError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent("MovieAgent/1.0")
            .build()?;
        Ok(Self::with_client(http))
    }

    /// Create a source sharing an existing HTTP client
    pub fn with_client(http: Client) -> Self {
        Self {
            http,
            endpoint: ITUNES_SEARCH_URL.to_string(),
            country: DEFAULT_COUNTRY.to_string(),
            limit: DEFAULT_LIMIT,
        }
    }

    /// Point at a different search endpoint (default: Apple's)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Configure the storefront country (default: US)
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    /// Configure the result limit, clamped to `[1, 200]` (default: 30)
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit.clamp(1, MAX_LIMIT);
        self
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Run one raw term search against the API
    #[instrument(skip(self))]
    pub async fn search_term(&self, term: &str, country: &str) -> Result<Vec<ItunesHit>, SearchError> {
        let limit = self.limit.to_string();
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("term", term),
                ("media", "movie"),
                ("entity", "movie"),
                ("country", country),
                ("limit", limit.as_str()),
                ("attribute", "movieTerm"),
            ])
            .send()
            .await
            .map_err(SearchError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "iTunes search failed");
            return Err(SearchError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(SearchError::from_transport)?;
        let parsed: ItunesResponse =
            serde_json::from_str(&body).map_err(|e| SearchError::Decode(e.to_string()))?;
        debug!("iTunes returned {} hits", parsed.results.len());
        Ok(parsed.results)
    }
}

#[async_trait]
impl CatalogSearch for ItunesSource {
    async fn search(&self, filters: &FilterSet) -> Result<Vec<CandidateItem>, SearchError> {
        let term = build_query(filters);
        let country = storefront(filters).unwrap_or_else(|| self.country.clone());
        let hits = self.search_term(&term, &country).await?;
        Ok(hits.into_iter().filter_map(ItunesHit::into_candidate).collect())
    }
}

/// Fold the filters into a single iTunes search term.
///
/// Order: query, genres, actors, directors, a year hint, include terms,
/// and a spelled-out language. Exclusions are never sent; they are
/// applied locally after the search.
pub fn build_query(filters: &FilterSet) -> String {
    let mut terms: Vec<String> = Vec::new();
    terms.extend(filters.query().map(str::to_string));
    for key in [FilterKey::Genres, FilterKey::Actors, FilterKey::Directors] {
        terms.extend(filters.terms(key).iter().cloned());
    }

    let year_hint = filters.year().or_else(|| {
        filters.year_range().map(|range| {
            if range.from() > FIRST_FILM_YEAR {
                range.from()
            } else {
                range.to()
            }
        })
    });
    terms.extend(year_hint.map(|year| year.to_string()));

    terms.extend(filters.terms(FilterKey::Include).iter().cloned());
    if let Some(language) = filters.language() {
        if country_code(language).is_none() {
            terms.push(language.to_string());
        }
    }

    let term = terms.join(" ").trim().to_string();
    if term.is_empty() {
        FALLBACK_TERM.to_string()
    } else {
        term
    }
}

/// Rewrite an iTunes artwork URL to the 600x600 rendition
pub fn upscale_artwork(url: &str) -> String {
    ARTWORK_SIZE_RE.replace(url, "600x600bb.jpg").into_owned()
}

/// YouTube search link for a title's trailer
pub fn youtube_trailer_link(title: &str, year: Option<u16>) -> String {
    let query = match year {
        Some(year) => format!("{title} trailer {year}"),
        None => format!("{title} trailer"),
    };
    Url::parse_with_params(YOUTUBE_RESULTS_URL, &[("search_query", query.as_str())])
        .map(String::from)
        .unwrap_or_else(|_| YOUTUBE_RESULTS_URL.to_string())
}

/// A two-letter language/country filter selects the storefront.
fn storefront(filters: &FilterSet) -> Option<String> {
    filters.language().and_then(country_code)
}

fn country_code(value: &str) -> Option<String> {
    let value = value.trim();
    (value.len() == 2 && value.chars().all(|c| c.is_ascii_alphabetic()))
        .then(|| value.to_ascii_uppercase())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

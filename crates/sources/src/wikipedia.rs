//! Plot summaries from the Wikipedia REST API (no API key).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

use crate::types::{SearchError, SummaryLookup};

pub const WIKIPEDIA_SUMMARY_URL: &str = "https://en.wikipedia.org/api/rest_v1/page/summary";

#[derive(Debug, Deserialize)]
struct PageSummary {
    extract: Option<String>,
    description: Option<String>,
}

/// Summary lookup against `/page/summary/{title}`
pub struct WikipediaSummaries {
    http: Client,
    endpoint: String,
}

impl WikipediaSummaries {
    pub fn new() -> Result<Self, SearchError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent("MovieAgent/1.0 (https://example.com)")
            .build()?;
        Ok(Self::with_client(http))
    }

    pub fn with_client(http: Client) -> Self {
        Self {
            http,
            endpoint: WIKIPEDIA_SUMMARY_URL.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Page URL for a title: spaces become underscores, the rest is
    /// percent-encoded as one path segment.
    fn page_url(&self, title: &str) -> Result<Url, SearchError> {
        let mut url = Url::parse(&self.endpoint).map_err(|e| SearchError::Decode(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| SearchError::Decode(format!("`{}` cannot take a path", self.endpoint)))?
            .pop_if_empty()
            .push(&title.trim().replace(' ', "_"));
        Ok(url)
    }
}

#[async_trait]
impl SummaryLookup for WikipediaSummaries {
    async fn summary(&self, title: &str) -> Result<Option<String>, SearchError> {
        if title.trim().is_empty() {
            return Ok(None);
        }

        let url = self.page_url(title)?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(SearchError::from_transport)?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                debug!(title, "No Wikipedia page");
                return Ok(None);
            }
            status if !status.is_success() => return Err(SearchError::Status(status.as_u16())),
            _ => {}
        }

        let body = response.text().await.map_err(SearchError::from_transport)?;
        let page: PageSummary =
            serde_json::from_str(&body).map_err(|e| SearchError::Decode(e.to_string()))?;

        Ok(page
            .extract
            .filter(|text| !text.trim().is_empty())
            .or(page.description.filter(|text| !text.trim().is_empty())))
    }
}

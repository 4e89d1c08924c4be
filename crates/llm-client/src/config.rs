//! Configuration for the llamafile backend.
//!
//! Values come from the environment once at startup. Command line flags
//! can override any of them after loading.

use std::env;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/v1";
pub const DEFAULT_API_KEY: &str = "sk-local-123";
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Connection settings for an OpenAI-compatible llamafile server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LlamafileConfig {
    /// Base URL including the `/v1` prefix
    pub base_url: String,
    /// Model id; when `None` the first entry of `GET /models` is used
    pub model: Option<String>,
    /// Bearer token; llamafile accepts any non-empty string
    pub api_key: String,
    pub timeout: Duration,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid base URL `{0}`: expected http:// or https://")]
    InvalidBaseUrl(String),
    #[error("API key must not be empty")]
    EmptyApiKey,
}

impl Default for LlamafileConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: None,
            api_key: DEFAULT_API_KEY.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl LlamafileConfig {
    /// Load from `LLAMAFILE_BASE_URL`, `LLAMAFILE_MODEL`,
    /// `LLAMAFILE_API_KEY` and `LLAMAFILE_TIMEOUT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from an arbitrary variable source.
    ///
    /// An unparsable timeout falls back to the default instead of failing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let config = Self {
            base_url: non_empty("LLAMAFILE_BASE_URL").unwrap_or(defaults.base_url),
            model: non_empty("LLAMAFILE_MODEL"),
            api_key: lookup("LLAMAFILE_API_KEY").unwrap_or(defaults.api_key),
            timeout: non_empty("LLAMAFILE_TIMEOUT")
                .and_then(|raw| raw.trim().parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(self.base_url.clone()));
        }
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::EmptyApiKey);
        }
        Ok(())
    }

    /// Base URL without a trailing slash.
    pub fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

//! Agent settings and the command line flags that override them.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use llm_client::LlamafileConfig;

/// Knobs for the agent around the dialogue engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentConfig {
    /// Results shown per page
    pub page_size: usize,
    /// How many of the first results get a summary attached
    pub enrich_top: usize,
    /// Catalog hits requested per search
    pub search_limit: u32,
    /// Default storefront country
    pub country: String,
    /// Bound on each model and catalog call
    pub call_timeout: Duration,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            page_size: dialogue::DEFAULT_PAGE_SIZE,
            enrich_top: 10,
            search_limit: 30,
            country: "US".to_string(),
            call_timeout: dialogue::DEFAULT_CALL_TIMEOUT,
        }
    }
}

/// Flags shared by every binary that builds an agent.
///
/// Backend settings start from the `LLAMAFILE_*` environment and are
/// overridden by whatever is passed explicitly.
#[derive(Args, Debug, Clone)]
pub struct AgentArgs {
    /// Base URL of the llamafile server, including `/v1`
    #[arg(long)]
    pub llm_base_url: Option<String>,

    /// Model id (default: first model the server lists)
    #[arg(long)]
    pub llm_model: Option<String>,

    /// Results per page
    #[arg(long, env = "MOVIE_AGENT_PAGE_SIZE", default_value = "5")]
    pub page_size: usize,

    /// Number of top results enriched with a plot summary
    #[arg(long, env = "MOVIE_AGENT_ENRICH_TOP", default_value = "10")]
    pub enrich_top: usize,

    /// Catalog hits requested per search (1-200)
    #[arg(long, env = "MOVIE_AGENT_SEARCH_LIMIT", default_value = "30")]
    pub search_limit: u32,

    /// Storefront country code
    #[arg(long, env = "MOVIE_AGENT_COUNTRY", default_value = "US")]
    pub country: String,

    /// Timeout for each model or catalog call, in seconds
    #[arg(long, env = "MOVIE_AGENT_CALL_TIMEOUT", default_value = "30")]
    pub call_timeout_secs: u64,
}

impl AgentArgs {
    /// Resolve the backend and agent configuration.
    pub fn resolve(&self) -> Result<(LlamafileConfig, AgentConfig)> {
        let mut llm = LlamafileConfig::from_env().context("Invalid LLAMAFILE_* environment")?;
        if let Some(base_url) = &self.llm_base_url {
            llm.base_url = base_url.clone();
        }
        if let Some(model) = &self.llm_model {
            llm.model = Some(model.clone());
        }
        llm.validate().context("Invalid llamafile settings")?;

        let agent = AgentConfig {
            page_size: self.page_size.max(1),
            enrich_top: self.enrich_top,
            search_limit: self.search_limit,
            country: self.country.trim().to_uppercase(),
            call_timeout: Duration::from_secs(self.call_timeout_secs.max(1)),
        };
        Ok((llm, agent))
    }
}

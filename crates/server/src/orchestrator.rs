//! # Movie Agent
//!
//! This module wraps the dialogue engine with everything a user-facing
//! transport needs:
//! 1. Agent commands (`help`, `more`, `details N`) answered from the session
//! 2. Everything else handed to the turn engine
//! 3. Plot summaries attached to the first returned candidates
//! 4. One reply record per input, ready to print or serialize
//!
//! Summary lookups run concurrently and never fail a turn; a missing
//! summary is only logged.

use std::ops::Range;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use dialogue::{Action, Session, TurnEngine};
use filters::FilterKey;
use llm_client::{LlamafileClient, LlamafileConfig};
use pipeline::RankedSearch;
use serde::Serialize;
use sources::{CandidateItem, ItunesSource, SummaryLookup, WikipediaSummaries};
use thiserror::Error;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::config::AgentConfig;

pub const HELP_MESSAGE: &str = "Describe what you'd like to watch in plain words, e.g. \
'lighthearted sci-fi from the 90s'. Commands: more, details N, refine ..., restart.";

/// Inputs the agent rejects without touching the session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AgentError {
    #[error("We haven't searched yet. Say what you want first.")]
    NotSearchedYet,

    #[error("Please specify a result number, e.g., 'details 2'.")]
    MissingIndex,

    #[error("Result {0} isn't on the current page. Use 'more' to see more.")]
    NotOnPage(usize),
}

/// What the agent did with an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyAction {
    Return,
    Clarify,
    Narrow,
    Restart,
    Unavailable,
    Help,
    More,
    Details,
}

impl ReplyAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplyAction::Return => "return",
            ReplyAction::Clarify => "clarify",
            ReplyAction::Narrow => "narrow",
            ReplyAction::Restart => "restart",
            ReplyAction::Unavailable => "unavailable",
            ReplyAction::Help => "help",
            ReplyAction::More => "more",
            ReplyAction::Details => "details",
        }
    }
}

impl From<Action> for ReplyAction {
    fn from(action: Action) -> Self {
        match action {
            Action::Return => ReplyAction::Return,
            Action::Clarify => ReplyAction::Clarify,
            Action::Narrow => ReplyAction::Narrow,
            Action::Restart => ReplyAction::Restart,
            Action::Unavailable => ReplyAction::Unavailable,
        }
    }
}

/// The record a transport renders for one input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentReply {
    pub session_id: Uuid,
    pub action: ReplyAction,
    pub message: String,
    /// Filters in effect, as `FilterSet::describe` renders them
    pub filters: String,
    /// One-based page number of `results`
    pub page: usize,
    pub has_more: bool,
    pub results: Vec<CandidateItem>,
    pub suggestions: Vec<FilterKey>,
    /// Candidate count of the last search, when this input ran one
    pub total: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<CandidateItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AgentCommand {
    Help,
    More,
    Details(Option<usize>),
    Turn,
}

impl AgentCommand {
    fn parse(input: &str) -> Self {
        let lowered = input.trim().to_lowercase();
        match lowered.as_str() {
            "help" | "?" => AgentCommand::Help,
            "more" | "next" => AgentCommand::More,
            "details" => AgentCommand::Details(None),
            _ => match lowered.strip_prefix("details ") {
                Some(rest) => AgentCommand::Details(rest.trim().parse().ok()),
                None => AgentCommand::Turn,
            },
        }
    }
}

/// The movie agent: dialogue engine plus paging, details and enrichment.
pub struct MovieAgent {
    engine: TurnEngine,
    summaries: Arc<dyn SummaryLookup>,
    config: AgentConfig,
}

impl MovieAgent {
    pub fn new(engine: TurnEngine, summaries: Arc<dyn SummaryLookup>, config: AgentConfig) -> Self {
        Self {
            engine,
            summaries,
            config,
        }
    }

    /// Build an agent backed by llamafile, the iTunes catalog and
    /// Wikipedia summaries.
    ///
    /// No request is made here; use `ready` to probe the model backend.
    pub fn connect(llm_config: LlamafileConfig, config: AgentConfig) -> Result<Self> {
        info!("Using llamafile at {}", llm_config.base());
        let llm = LlamafileClient::new(llm_config).context("Failed to build LLM client")?;

        let catalog = ItunesSource::new()
            .context("Failed to build catalog client")?
            .with_country(config.country.clone())
            .with_limit(config.search_limit);
        let search = RankedSearch::new(catalog);
        let summaries = WikipediaSummaries::new().context("Failed to build summary client")?;

        let engine = TurnEngine::new(Arc::new(llm), Arc::new(search)).with_timeout(config.call_timeout);
        Ok(Self::new(engine, Arc::new(summaries), config))
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Start a conversation with the configured page size
    pub fn new_session(&self) -> Session {
        Session::new().with_page_size(self.config.page_size)
    }

    /// Whether the model backend can take requests
    pub async fn ready(&self) -> bool {
        self.engine.ready().await
    }

    /// Answer one user input within `session`.
    #[instrument(skip(self, session), fields(session = %session.id()))]
    pub async fn handle(&self, session: &mut Session, input: &str) -> Result<AgentReply, AgentError> {
        let start_time = Instant::now();

        let reply = match AgentCommand::parse(input) {
            AgentCommand::Help => self.reply(session, ReplyAction::Help, HELP_MESSAGE.to_string()),
            AgentCommand::More => self.more(session).await?,
            AgentCommand::Details(index) => self.details(session, index).await?,
            AgentCommand::Turn => self.turn(session, input).await,
        };

        info!(
            action = reply.action.as_str(),
            results = reply.results.len(),
            "Handled input in {:.2?}",
            start_time.elapsed()
        );
        Ok(reply)
    }

    async fn turn(&self, session: &mut Session, input: &str) -> AgentReply {
        let turn = self.engine.process(session, input).await;

        if turn.action == Action::Return {
            self.enrich(session, 0..self.config.enrich_top).await;
        }

        let mut reply = self.reply(session, turn.action.into(), turn.message);
        reply.suggestions = turn.suggestions;
        reply.total = turn.total;
        if turn.action == Action::Return {
            reply.results = session.current_page().to_vec();
        }
        reply
    }

    async fn more(&self, session: &mut Session) -> Result<AgentReply, AgentError> {
        if session.results().is_empty() {
            return Err(AgentError::NotSearchedYet);
        }

        session.next_page();
        let start = session.page_offset();
        let end = start + session.current_page().len();
        self.enrich(session, start..end).await;

        let message = format!(
            "Showing page {} ({}-{} of {}).",
            session.page() + 1,
            start + 1,
            end,
            session.results().len()
        );
        let mut reply = self.reply(session, ReplyAction::More, message);
        reply.results = session.current_page().to_vec();
        Ok(reply)
    }

    async fn details(&self, session: &mut Session, index: Option<usize>) -> Result<AgentReply, AgentError> {
        let index = index.ok_or(AgentError::MissingIndex)?;
        if session.results().is_empty() {
            return Err(AgentError::NotSearchedYet);
        }
        if index == 0 || index > session.current_page().len() {
            return Err(AgentError::NotOnPage(index));
        }

        let position = session.page_offset() + index - 1;
        self.enrich(session, position..position + 1).await;
        let item = session
            .results()
            .get(position)
            .cloned()
            .ok_or(AgentError::NotOnPage(index))?;

        let mut reply = self.reply(session, ReplyAction::Details, format!("Details for {}.", item.title));
        reply.results = vec![item.clone()];
        reply.details = Some(item);
        Ok(reply)
    }

    /// Attach summaries to stored results in `range` that have none.
    async fn enrich(&self, session: &mut Session, range: Range<usize>) {
        let mut tasks = JoinSet::new();
        for (position, item) in session.results().iter().enumerate() {
            if !range.contains(&position) || item.summary.is_some() {
                continue;
            }
            let summaries = self.summaries.clone();
            let title = item.title.clone();
            let limit = self.config.call_timeout;
            tasks.spawn(async move { (position, timeout(limit, summaries.summary(&title)).await) });
        }
        if tasks.is_empty() {
            return;
        }

        let mut attached = 0;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((position, Ok(Ok(Some(summary))))) => {
                    if let Some(item) = session.results_mut().get_mut(position) {
                        item.summary = Some(summary);
                        attached += 1;
                    }
                }
                Ok((position, Ok(Ok(None)))) => debug!("No summary for result {}", position + 1),
                Ok((position, Ok(Err(err)))) => warn!("Summary lookup failed for result {}: {}", position + 1, err),
                Ok((position, Err(_))) => warn!("Summary lookup timed out for result {}", position + 1),
                Err(err) => warn!("Summary task failed: {}", err),
            }
        }
        debug!("Attached {} summaries", attached);
    }

    fn reply(&self, session: &Session, action: ReplyAction, message: String) -> AgentReply {
        AgentReply {
            session_id: session.id(),
            action,
            message,
            filters: session.filters().describe(),
            page: session.page() + 1,
            has_more: session.has_more(),
            results: Vec::new(),
            suggestions: Vec::new(),
            total: None,
            details: None,
        }
    }
}

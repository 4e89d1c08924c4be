//! The turn engine: one user utterance in, one reply out.
//!
//! ## Steps
//! 1. Classify the command (restart short-cuts everything else)
//! 2. Extract filters with the model and parse its answer
//! 3. Merge with the session's filters
//! 4. Ask the policy whether to search at all
//! 5. Search, then ask the policy what to do with the results
//! 6. Phrase a follow-up question for clarify and narrow turns
//!
//! Both external calls are bounded by the engine timeout. A model
//! failure counts as "nothing understood"; a search failure is reported
//! as unavailable, never as zero results.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use filters::{FilterKey, FilterParser, FilterSet, ParseOutcome, TurnCommand, merge};
use llm_client::{EXTRACTION_SAMPLING, TextCompletion, prompts};
use serde::Serialize;
use sources::{CandidateItem, CatalogSearch, SearchError};
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

use crate::command::classify;
use crate::policy::{self, Action, DialogueState};
use crate::questions::QuestionWriter;
use crate::session::{Session, Turn};

pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

pub const RESTART_MESSAGE: &str = "Filters cleared. What would you like to watch?";
pub const UNAVAILABLE_MESSAGE: &str =
    "The movie catalog is not reachable right now. Please try again in a moment.";

/// Everything a transport needs to render one turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnReply {
    pub state: DialogueState,
    pub action: Action,
    /// Question, notice or results headline
    pub message: String,
    /// Filters in effect after the turn
    pub filters: FilterSet,
    /// Candidates to show; only filled for `Action::Return`
    pub candidates: Vec<CandidateItem>,
    /// Candidate count from the search, `None` when no search ran
    pub total: Option<usize>,
    /// Dimensions offered to clarify or narrow by
    pub suggestions: Vec<FilterKey>,
    /// Whether the request produced any usable filter signal
    pub understood: bool,
}

/// Drives one session turn by turn.
///
/// The engine holds no per-conversation state; every call takes the
/// session it works on.
pub struct TurnEngine {
    llm: Arc<dyn TextCompletion>,
    search: Arc<dyn CatalogSearch>,
    parser: FilterParser,
    questions: QuestionWriter,
    call_timeout: Duration,
}

impl TurnEngine {
    pub fn new(llm: Arc<dyn TextCompletion>, search: Arc<dyn CatalogSearch>) -> Self {
        Self {
            questions: QuestionWriter::new(llm.clone(), DEFAULT_CALL_TIMEOUT),
            llm,
            search,
            parser: FilterParser::new(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Bound every model and catalog call (default: 30s)
    pub fn with_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self.questions = QuestionWriter::new(self.llm.clone(), call_timeout);
        self
    }

    /// Replace the parser, e.g. to pin the current year in tests
    pub fn with_parser(mut self, parser: FilterParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn parser(&self) -> &FilterParser {
        &self.parser
    }

    /// Whether the model backend can take requests.
    pub async fn ready(&self) -> bool {
        self.llm.ready().await
    }

    /// Process one utterance and record it in the session.
    #[instrument(skip(self, session), fields(session = %session.id()))]
    pub async fn process(&self, session: &mut Session, utterance: &str) -> TurnReply {
        let (command, text) = classify(utterance);

        if command == TurnCommand::Restart {
            info!("Restarting conversation");
            session.record(Turn {
                utterance: utterance.to_string(),
                command,
                outcome: None,
                filters: FilterSet::new(),
                action: Action::Restart,
                candidate_count: None,
                at: Utc::now(),
            });
            return TurnReply {
                state: DialogueState::AwaitingInput,
                action: Action::Restart,
                message: RESTART_MESSAGE.to_string(),
                filters: FilterSet::new(),
                candidates: Vec::new(),
                total: None,
                suggestions: Vec::new(),
                understood: true,
            };
        }

        let outcome = match command {
            TurnCommand::Refine => {
                let (cleared, remainder) = self.parser.extract_clears(&text);
                self.extract(&remainder).await.with_cleared(cleared)
            }
            _ => self.extract(&text).await,
        };

        let previous = session.filters().clone();
        let merged = merge(&previous, &outcome, command);
        debug!(filters = %merged, ok = outcome.ok, "Merged filters");

        let (state, candidates, total) = match policy::before_search(&outcome, &previous, &merged) {
            Some(state) => (state, Vec::new(), None),
            None => match self.run_search(&merged).await {
                Ok(candidates) => {
                    let total = candidates.len();
                    (policy::after_search(total), candidates, Some(total))
                }
                Err(err) => {
                    warn!("Search unavailable: {}", err);
                    (DialogueState::SearchUnavailable, Vec::new(), None)
                }
            },
        };

        let reply = self
            .reply_for(state, &text, merged, candidates, total, outcome.ok, session)
            .await;

        info!(
            action = reply.action.as_str(),
            total = ?reply.total,
            filters = %reply.filters,
            "Turn complete"
        );
        session.record(Turn {
            utterance: utterance.to_string(),
            command,
            outcome: Some(outcome),
            filters: reply.filters.clone(),
            action: reply.action,
            candidate_count: total,
            at: Utc::now(),
        });
        reply
    }

    /// Ask the model for filters. Failures and timeouts yield an empty
    /// outcome; empty text skips the call.
    async fn extract(&self, text: &str) -> ParseOutcome {
        if text.trim().is_empty() {
            return ParseOutcome::empty();
        }

        let (system, user) = prompts::extraction(text);
        match timeout(self.call_timeout, self.llm.complete(system, &user, EXTRACTION_SAMPLING)).await {
            Ok(Ok(raw)) => self.parser.parse(&raw),
            Ok(Err(err)) => {
                warn!("Filter extraction failed: {}", err);
                ParseOutcome::empty()
            }
            Err(_) => {
                warn!("Filter extraction timed out after {:?}", self.call_timeout);
                ParseOutcome::empty()
            }
        }
    }

    async fn run_search(&self, filters: &FilterSet) -> Result<Vec<CandidateItem>, SearchError> {
        match timeout(self.call_timeout, self.search.search(filters)).await {
            Ok(result) => result,
            Err(_) => Err(SearchError::Timeout),
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn reply_for(
        &self,
        state: DialogueState,
        text: &str,
        filters: FilterSet,
        candidates: Vec<CandidateItem>,
        total: Option<usize>,
        understood: bool,
        session: &mut Session,
    ) -> TurnReply {
        let mut reply = TurnReply {
            state,
            action: state.action().unwrap_or(Action::Clarify),
            message: String::new(),
            filters,
            candidates: Vec::new(),
            total,
            suggestions: Vec::new(),
            understood,
        };

        match state {
            DialogueState::ReturnResults => {
                reply.message = if reply.filters.is_unconstrained() {
                    format!("Found {} matches.", candidates.len())
                } else {
                    format!("Found {} matches for {}.", candidates.len(), reply.filters)
                };
                session.set_results(candidates.clone());
                session.mark_shown();
                reply.candidates = candidates;
            }
            DialogueState::AskNarrow => {
                let count = candidates.len();
                reply.suggestions = policy::narrowing_suggestions(&reply.filters);
                reply.message = self
                    .questions
                    .narrowing(text, &reply.filters, count, &reply.suggestions)
                    .await;
                // kept so "more" can page through them anyway
                session.set_results(candidates);
            }
            DialogueState::AskClarify => {
                reply.suggestions = policy::clarifying_suggestions(&reply.filters);
                reply.message = self
                    .questions
                    .clarifying(text, &reply.filters, &reply.suggestions)
                    .await;
                session.clear_results();
            }
            DialogueState::SearchUnavailable => {
                reply.message = UNAVAILABLE_MESSAGE.to_string();
                // earlier results no longer match the adopted filters
                session.clear_results();
            }
            DialogueState::AwaitingInput => {}
        }
        reply
    }
}

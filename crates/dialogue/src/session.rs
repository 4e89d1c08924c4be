//! Per-conversation state: filters, turn log and result paging.

use chrono::{DateTime, Utc};
use filters::{FilterSet, ParseOutcome, TurnCommand};
use serde::Serialize;
use sources::CandidateItem;
use uuid::Uuid;

use crate::policy::Action;

pub const DEFAULT_PAGE_SIZE: usize = 5;

/// One processed user utterance. Turns are never edited after recording.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Turn {
    pub utterance: String,
    pub command: TurnCommand,
    /// `None` for restarts, which skip parsing
    pub outcome: Option<ParseOutcome>,
    /// Filters in effect after this turn
    pub filters: FilterSet,
    pub action: Action,
    /// `None` when no search ran
    pub candidate_count: Option<usize>,
    pub at: DateTime<Utc>,
}

/// State of one conversation. Owned by exactly one caller at a time.
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    created_at: DateTime<Utc>,
    filters: FilterSet,
    turns: Vec<Turn>,
    /// Index of the first turn after the latest restart
    epoch_start: usize,
    results: Vec<CandidateItem>,
    page: usize,
    page_size: usize,
    /// Whether the current page has been presented to the user
    shown: bool,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            filters: FilterSet::new(),
            turns: Vec::new(),
            epoch_start: 0,
            results: Vec::new(),
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
            shown: false,
        }
    }

    /// Configure results per page (default: 5, minimum 1)
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Filters currently in effect
    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    /// Every turn ever recorded, restarts included
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Turns since the latest restart
    pub fn effective_history(&self) -> &[Turn] {
        &self.turns[self.epoch_start..]
    }

    /// Append a turn and adopt its filters.
    ///
    /// A restart turn also starts a new epoch and drops the last results.
    pub fn record(&mut self, turn: Turn) {
        self.filters = turn.filters.clone();
        let restart = turn.command == TurnCommand::Restart;
        self.turns.push(turn);
        if restart {
            self.epoch_start = self.turns.len();
            self.clear_results();
        }
    }

    // -------------------------------------------------------------------------
    // Paging
    // -------------------------------------------------------------------------

    /// Replace the stored candidates and go back to the first page.
    ///
    /// The first page counts as unseen until `mark_shown` is called.
    pub fn set_results(&mut self, results: Vec<CandidateItem>) {
        self.results = results;
        self.page = 0;
        self.shown = false;
    }

    pub fn mark_shown(&mut self) {
        self.shown = true;
    }

    pub fn clear_results(&mut self) {
        self.set_results(Vec::new());
    }

    pub fn results(&self) -> &[CandidateItem] {
        &self.results
    }

    pub fn results_mut(&mut self) -> &mut [CandidateItem] {
        &mut self.results
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Zero-based index of the page being shown
    pub fn page(&self) -> usize {
        self.page
    }

    /// Position of the first item of the current page within `results()`
    pub fn page_offset(&self) -> usize {
        self.page * self.page_size
    }

    pub fn current_page(&self) -> &[CandidateItem] {
        let start = self.page_offset().min(self.results.len());
        let end = (start + self.page_size).min(self.results.len());
        &self.results[start..end]
    }

    /// Whether a call to `next_page` would show anything new
    pub fn has_more(&self) -> bool {
        if !self.shown {
            return !self.results.is_empty();
        }
        (self.page + 1) * self.page_size < self.results.len()
    }

    /// Show the next unseen page and return it.
    ///
    /// Results stored without being shown (a narrowing turn) start at
    /// the first page; past the end the last page is repeated.
    pub fn next_page(&mut self) -> &[CandidateItem] {
        if !self.shown {
            self.shown = true;
        } else if self.has_more() {
            self.page += 1;
        }
        self.current_page()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

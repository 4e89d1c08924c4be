//! The dialogue policy: what the agent does after each turn.
//!
//! The policy is a pure function of the parse outcome, the filters before
//! and after the merge, and the number of candidates the search returned.
//!
//! ```text
//!                 ┌──────────────── parse failed, nothing known ─────────┐
//!                 │                                                       ▼
//! AWAITING_INPUT ─┴─ search ─┬─ n == 0 ──────────────────────────► ASK_CLARIFY
//!       ▲                    ├─ n > NARROW_THRESHOLD ────────────► ASK_NARROW
//!       │                    ├─ 1..=NARROW_THRESHOLD ────────────► RETURN_RESULTS
//!       │                    └─ error / timeout ─────────────────► SEARCH_UNAVAILABLE
//!       └──────────────────────── next user input ◄──────────────────────┘
//! ```

use filters::{FilterKey, FilterSet, ParseOutcome};
use serde::Serialize;

/// Above this many candidates the agent asks the user to narrow down.
pub const NARROW_THRESHOLD: usize = 10;

/// Dimensions offered when the request gave nothing to work with.
const STARTER_DIMENSIONS: [FilterKey; 3] = [FilterKey::Genres, FilterKey::Year, FilterKey::Actors];

/// Dimensions offered for narrowing, in the order they are suggested.
const NARROWING_ORDER: [FilterKey; 6] = [
    FilterKey::Year,
    FilterKey::Genres,
    FilterKey::Actors,
    FilterKey::Directors,
    FilterKey::Language,
    FilterKey::Exclude,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DialogueState {
    AwaitingInput,
    ReturnResults,
    AskClarify,
    AskNarrow,
    SearchUnavailable,
}

/// What the transport shows for a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Return,
    Clarify,
    Narrow,
    Restart,
    Unavailable,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Return => "return",
            Action::Clarify => "clarify",
            Action::Narrow => "narrow",
            Action::Restart => "restart",
            Action::Unavailable => "unavailable",
        }
    }
}

impl DialogueState {
    /// Transport action for a terminal state; `None` for `AwaitingInput`.
    pub fn action(&self) -> Option<Action> {
        match self {
            DialogueState::AwaitingInput => None,
            DialogueState::ReturnResults => Some(Action::Return),
            DialogueState::AskClarify => Some(Action::Clarify),
            DialogueState::AskNarrow => Some(Action::Narrow),
            DialogueState::SearchUnavailable => Some(Action::Unavailable),
        }
    }
}

/// Decide before searching.
///
/// Returns `Some(AskClarify)` when the parse found nothing and the merged
/// filters are still fully unconstrained; the search is skipped then.
pub fn before_search(
    outcome: &ParseOutcome,
    previous: &FilterSet,
    merged: &FilterSet,
) -> Option<DialogueState> {
    (!outcome.ok && merged == previous && merged.is_unconstrained()).then_some(DialogueState::AskClarify)
}

/// Decide from the number of candidates a successful search returned.
pub fn after_search(candidate_count: usize) -> DialogueState {
    match candidate_count {
        0 => DialogueState::AskClarify,
        n if n > NARROW_THRESHOLD => DialogueState::AskNarrow,
        _ => DialogueState::ReturnResults,
    }
}

/// Unconstrained dimensions worth narrowing by.
///
/// `year` counts as constrained when either `year` or `year_range` is set.
pub fn narrowing_suggestions(filters: &FilterSet) -> Vec<FilterKey> {
    NARROWING_ORDER
        .into_iter()
        .filter(|key| match key {
            FilterKey::Year => !filters.contains(FilterKey::Year) && !filters.contains(FilterKey::YearRange),
            key => !filters.contains(*key),
        })
        .collect()
}

/// Dimensions to ask about after an empty or unusable turn.
///
/// With no filters at all, suggest dimensions to add; otherwise suggest
/// relaxing the ones in effect.
pub fn clarifying_suggestions(filters: &FilterSet) -> Vec<FilterKey> {
    if filters.is_unconstrained() {
        STARTER_DIMENSIONS.to_vec()
    } else {
        filters.iter().map(|(key, _)| key).collect()
    }
}

//! Cross-turn filter merging.
//!
//! The last stated constraint is authoritative: incoming values replace
//! previous ones key by key, keys the new turn is silent about carry
//! over, so a conversation narrows over time. Merging is a pure
//! function of its inputs, so replaying the same turns always gives the
//! same final set.

use serde::Serialize;

use crate::parser::ParseOutcome;
use crate::types::FilterSet;

/// How a turn's parse is folded into the running filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnCommand {
    /// Plain request; clear instructions are ignored
    Search,
    /// `refine ...`; clear instructions remove keys before overwriting
    Refine,
    /// `restart` / `new search`; everything is dropped
    Restart,
}

/// Merge `incoming` into `previous` according to `command`.
///
/// `previous` is never modified; a new set is returned.
pub fn merge(previous: &FilterSet, incoming: &ParseOutcome, command: TurnCommand) -> FilterSet {
    let base = match command {
        TurnCommand::Restart => return FilterSet::new(),
        TurnCommand::Search => previous.clone(),
        TurnCommand::Refine => incoming
            .cleared
            .iter()
            .fold(previous.clone(), |acc, key| acc.without(*key)),
    };

    incoming.filters.iter().fold(base, |acc, (key, value)| {
        // keys and values in a FilterSet are always kind-consistent
        acc.with(key, value.clone()).unwrap_or(acc)
    })
}

/// Fold a whole turn sequence from the unconstrained set.
pub fn replay<'a, I>(turns: I) -> FilterSet
where
    I: IntoIterator<Item = (&'a ParseOutcome, TurnCommand)>,
{
    turns
        .into_iter()
        .fold(FilterSet::new(), |acc, (incoming, command)| merge(&acc, incoming, command))
}

//! Integration tests for the filter contract across whole conversations.
//!
//! These exercise parser and merger together, the way the dialogue
//! engine drives them turn after turn.

use filters::{FilterKey, FilterParser, FilterSet, ParseOutcome, TurnCommand, merge, replay};

fn parser() -> FilterParser {
    FilterParser::with_current_year(2025)
}

/// A handful of histories of different shapes
fn histories() -> Vec<Vec<(ParseOutcome, TurnCommand)>> {
    let p = parser();
    vec![
        vec![],
        vec![(p.parse(r#"{"query":"disney"}"#), TurnCommand::Search)],
        vec![
            (p.parse(r#"{"genres":["Sci-Fi"],"year":1982}"#), TurnCommand::Search),
            (p.parse("garbage"), TurnCommand::Search),
            (p.parse(r#"{"exclude":["gore"]}"#), TurnCommand::Refine),
        ],
        vec![
            (p.parse(r#"{"actors":["Tom Hanks"]}"#), TurnCommand::Search),
            (ParseOutcome::empty(), TurnCommand::Restart),
            (p.parse(r#"{"directors":["Nora Ephron"]}"#), TurnCommand::Search),
        ],
    ]
}

fn fold(history: &[(ParseOutcome, TurnCommand)]) -> FilterSet {
    replay(history.iter().map(|(outcome, command)| (outcome, *command)))
}

#[test]
fn test_restart_after_any_history_is_unconstrained() {
    for history in histories() {
        let before = fold(&history);
        let incoming = parser().parse(r#"{"query":"ignored on restart"}"#);
        let after = merge(&before, &incoming, TurnCommand::Restart);
        assert!(after.is_unconstrained(), "history {history:?} left {after}");
    }
}

#[test]
fn test_silent_turn_keeps_every_key() {
    for history in histories() {
        let before = fold(&history);
        let after = merge(&before, &parser().parse("xyzzy nonsense"), TurnCommand::Search);
        assert_eq!(before, after);
    }
}

#[test]
fn test_second_turn_overrides_first() {
    let p = parser();
    let first = merge(
        &FilterSet::new(),
        &p.parse(r#"{"query":"comedy","year":1999,"genres":["Comedy"]}"#),
        TurnCommand::Search,
    );
    let second = merge(&first, &p.parse(r#"{"year":2004}"#), TurnCommand::Search);

    assert_eq!(second.year(), Some(2004));
    assert_eq!(second.query(), Some("comedy"));
    assert_eq!(second.terms(FilterKey::Genres), &["Comedy"]);
}

#[test]
fn test_refine_clear_genre_scenario() {
    let p = parser();
    let first = merge(&FilterSet::new(), &p.parse(r#"{"genres":["sci-fi"]}"#), TurnCommand::Search);
    assert_eq!(first.terms(FilterKey::Genres), &["sci-fi"]);

    let (cleared, remainder) = p.extract_clears("clear genre");
    assert!(remainder.is_empty());
    let second = merge(&first, &ParseOutcome::empty().with_cleared(cleared), TurnCommand::Refine);

    assert!(!second.contains(FilterKey::Genres));
    assert!(second.is_unconstrained());
}

#[test]
fn test_replay_matches_incremental_merging() {
    for history in histories() {
        let mut running = FilterSet::new();
        for (outcome, command) in &history {
            running = merge(&running, outcome, *command);
        }
        assert_eq!(running, fold(&history));
    }
}

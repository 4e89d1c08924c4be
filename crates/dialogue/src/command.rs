//! Classifying raw user input into a turn command.

use filters::TurnCommand;

const RESTART_PHRASES: [&str; 3] = ["restart", "new search", "start over"];

/// Split user input into the command and the text left to parse.
///
/// - `restart` / `new search` / `start over` → `Restart` with no text
/// - `refine ...` / `refine: ...` → `Refine` with the prefix stripped
/// - anything else → `Search` with the trimmed input
pub fn classify(input: &str) -> (TurnCommand, String) {
    let trimmed = input.trim();
    let normalized = trimmed
        .trim_end_matches(['.', '!'])
        .to_lowercase();

    if RESTART_PHRASES.contains(&normalized.as_str()) {
        return (TurnCommand::Restart, String::new());
    }

    if let Some(rest) = strip_keyword(trimmed, "refine") {
        let rest = rest.strip_prefix(':').unwrap_or(rest);
        return (TurnCommand::Refine, rest.trim().to_string());
    }

    (TurnCommand::Search, trimmed.to_string())
}

/// Case-insensitive keyword prefix followed by end of input, `:` or whitespace.
fn strip_keyword<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    let head = text.get(..keyword.len())?;
    if !head.eq_ignore_ascii_case(keyword) {
        return None;
    }
    let rest = &text[keyword.len()..];
    match rest.chars().next() {
        None => Some(rest),
        Some(c) if c == ':' || c.is_whitespace() => Some(rest.trim_start()),
        Some(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restart_phrases() {
        for input in ["restart", "  Restart ", "new search", "New Search.", "start over!"] {
            assert_eq!(classify(input), (TurnCommand::Restart, String::new()), "{input:?}");
        }
        assert_eq!(classify("restart the movie").0, TurnCommand::Search);
    }

    #[test]
    fn test_refine_prefixes() {
        assert_eq!(
            classify("refine: clear genre"),
            (TurnCommand::Refine, "clear genre".to_string())
        );
        assert_eq!(
            classify("Refine no horror from 2015-2020"),
            (TurnCommand::Refine, "no horror from 2015-2020".to_string())
        );
        assert_eq!(classify("refine"), (TurnCommand::Refine, String::new()));
        assert_eq!(classify("refine :  only 1990s"), (TurnCommand::Refine, "only 1990s".to_string()));
    }

    #[test]
    fn test_plain_search() {
        assert_eq!(
            classify(" romantic comedy from 2005 "),
            (TurnCommand::Search, "romantic comedy from 2005".to_string())
        );
        assert_eq!(classify("refined thrillers").0, TurnCommand::Search);
        assert_eq!(classify(""), (TurnCommand::Search, String::new()));
    }
}

//! Plain-text rendering of candidates for terminals and logs.

use sources::CandidateItem;

/// Longest summary shown in a brief listing, in characters.
const BRIEF_SUMMARY_CHARS: usize = 180;

/// One numbered listing line plus an indented summary excerpt.
///
/// ```text
/// 1. Alien (1979) [Sci-Fi & Fantasy]
///    A commercial crew answers a distress call...
/// ```
pub fn render_brief(index: usize, item: &CandidateItem) -> String {
    let mut line = format!("{}. {}", index, title_with_year(item));
    if let Some(genre) = &item.genre {
        line.push_str(&format!(" [{genre}]"));
    }
    if let Some(summary) = &item.summary {
        line.push_str("\n   ");
        line.push_str(&truncate(summary, BRIEF_SUMMARY_CHARS));
    }
    line
}

/// Every known field, one per line.
pub fn render_full(item: &CandidateItem) -> String {
    let mut lines = vec![format!("Title: {}", item.title)];
    if let Some(year) = item.year {
        lines.push(format!("Year: {year}"));
    }
    if let Some(genre) = &item.genre {
        lines.push(format!("Genre: {genre}"));
    }
    if let Some(summary) = &item.summary {
        lines.push(format!("Plot: {summary}"));
    }
    if let Some(poster) = &item.poster_url {
        lines.push(format!("Poster: {poster}"));
    }
    if let Some(trailer) = &item.trailer_url {
        lines.push(format!("Trailer: {trailer}"));
    }
    lines.join("\n")
}

fn title_with_year(item: &CandidateItem) -> String {
    match item.year {
        Some(year) => format!("{} ({})", item.title, year),
        None => item.title.clone(),
    }
}

/// Cut at `max` characters on a char boundary, marking the cut with "…".
fn truncate(text: &str, max: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{}…", cut.trim_end())
}

//! Follow-up questions for clarify and narrow turns.
//!
//! The model phrases the question; when it fails, times out or answers
//! with nothing usable, a fixed question built from the suggested
//! dimensions is used instead.

use std::sync::Arc;
use std::time::Duration;

use filters::{FilterKey, FilterSet};
use llm_client::{QUESTION_SAMPLING, TextCompletion, prompts};
use tokio::time::timeout;
use tracing::{debug, warn};

/// Longest question accepted from the model, in words.
const MAX_QUESTION_WORDS: usize = 40;

pub struct QuestionWriter {
    llm: Arc<dyn TextCompletion>,
    timeout: Duration,
}

impl QuestionWriter {
    pub fn new(llm: Arc<dyn TextCompletion>, timeout: Duration) -> Self {
        Self { llm, timeout }
    }

    /// Question after an empty result or an unusable request.
    pub async fn clarifying(&self, user_text: &str, filters: &FilterSet, suggestions: &[FilterKey]) -> String {
        let (system, user) = prompts::clarifying_question(user_text, filters);
        match self.ask(system, &user).await {
            Some(question) => question,
            None => fallback_clarifying(filters, suggestions),
        }
    }

    /// Question after too many results.
    pub async fn narrowing(
        &self,
        user_text: &str,
        filters: &FilterSet,
        total: usize,
        suggestions: &[FilterKey],
    ) -> String {
        let (system, user) = prompts::narrowing_question(user_text, filters, total);
        match self.ask(system, &user).await {
            Some(question) => question,
            None => fallback_narrowing(total, suggestions),
        }
    }

    async fn ask(&self, system: &str, user: &str) -> Option<String> {
        match timeout(self.timeout, self.llm.complete(system, user, QUESTION_SAMPLING)).await {
            Ok(Ok(text)) => {
                let question = tidy_question(&text);
                if question.is_none() {
                    debug!("Discarding unusable question from model");
                }
                question
            }
            Ok(Err(err)) => {
                warn!("Question generation failed: {}", err);
                None
            }
            Err(_) => {
                warn!("Question generation timed out after {:?}", self.timeout);
                None
            }
        }
    }
}

/// First non-empty line, unquoted; `None` if empty or rambling.
fn tidy_question(raw: &str) -> Option<String> {
    let line = raw.lines().map(str::trim).find(|line| !line.is_empty())?;
    let line = line.trim_matches(|c| c == '"' || c == '\'' || c == '`').trim();
    if line.is_empty() || line.split_whitespace().count() > MAX_QUESTION_WORDS {
        return None;
    }
    Some(line.to_string())
}

fn key_phrase(key: FilterKey) -> &'static str {
    match key {
        FilterKey::Query => "keywords",
        FilterKey::Year | FilterKey::YearRange => "release year",
        FilterKey::Genres => "genre",
        FilterKey::Actors => "actors",
        FilterKey::Directors => "director",
        FilterKey::Language => "language or country",
        FilterKey::Include => "must-have themes",
        FilterKey::Exclude => "things to avoid",
    }
}

/// "a, b or c" with duplicate phrases removed.
fn join_phrases(keys: &[FilterKey]) -> String {
    let mut phrases: Vec<&str> = Vec::new();
    for key in keys {
        let phrase = key_phrase(*key);
        if !phrases.contains(&phrase) {
            phrases.push(phrase);
        }
    }
    match phrases.split_last() {
        None => String::new(),
        Some((last, [])) => (*last).to_string(),
        Some((last, rest)) => format!("{} or {}", rest.join(", "), last),
    }
}

pub(crate) fn fallback_clarifying(filters: &FilterSet, suggestions: &[FilterKey]) -> String {
    if filters.is_unconstrained() {
        format!(
            "I couldn't tell what you're looking for. Could you mention a {}?",
            join_phrases(suggestions)
        )
    } else {
        format!(
            "I found nothing for {}. Would you like to relax the {}?",
            filters.describe(),
            join_phrases(suggestions)
        )
    }
}

pub(crate) fn fallback_narrowing(total: usize, suggestions: &[FilterKey]) -> String {
    if suggestions.is_empty() {
        return format!("I found {total} matches. Could you add more detail to your request?");
    }
    format!(
        "I found {total} matches. Could you narrow it down by {}?",
        join_phrases(&suggestions[..suggestions.len().min(3)])
    )
}

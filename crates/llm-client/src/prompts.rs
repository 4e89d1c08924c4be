//! Prompt templates sent to the model.
//!
//! Each builder returns `(system_prompt, user_text)` ready for
//! [`TextCompletion::complete`](crate::TextCompletion::complete).

use filters::FilterSet;

/// Sampling settings for a prompt family
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampling {
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

/// Extraction must be reproducible: greedy decoding, no length cap.
pub const EXTRACTION_SAMPLING: Sampling = Sampling {
    temperature: 0.0,
    max_tokens: None,
};

/// Follow-up questions: a little variety, one short sentence.
pub const QUESTION_SAMPLING: Sampling = Sampling {
    temperature: 0.2,
    max_tokens: Some(64),
};

const EXTRACTION_SYSTEM: &str = "You extract movie search filters from user requests. \
Output only minified JSON matching this schema: \
{\"query\":str,\"include_terms\":[str],\"exclude_terms\":[str],\"genres\":[str],\
\"actors\":[str],\"directors\":[str],\"year\":int|null,\"year_from\":int|null,\
\"year_to\":int|null,\"country\":str|null,\"clear\":[str]}. \
Only fill fields the request states; leave the rest null or empty. \
Use \"clear\" for filters the user asks to drop. \
Do not include any text before or after the JSON.";

const CLARIFY_SYSTEM: &str = "You are a helpful movie recommendation assistant.\n\
The previous search returned zero results.\n\
Ask the user ONE concise question to disambiguate or broaden their request.\n\
Prefer asking about genre, year range, actors, directors, language/country, or willingness to relax constraints.\n\
Keep it under 25 words. Output just the question.";

const NARROW_SYSTEM: &str = "You are a helpful movie recommendation assistant.\n\
The previous search returned many results.\n\
Ask the user ONE concise question to help narrow down the list.\n\
Suggest narrowing by sub-genre, year range, specific actors/directors, runtime, language/country, or exclusions.\n\
Keep it under 25 words. Output just the question.";

/// Filter extraction for a single user request.
///
/// Only the new request is sent; merging with earlier turns happens
/// locally and deterministically.
pub fn extraction(user_text: &str) -> (&'static str, String) {
    (EXTRACTION_SYSTEM, format!("User request: {user_text}"))
}

/// Clarifying question after an empty result set.
pub fn clarifying_question(user_text: &str, filters: &FilterSet) -> (&'static str, String) {
    (
        CLARIFY_SYSTEM,
        format!(
            "User request: {user_text}\nCurrent filters (JSON):\n{}",
            filters_json(filters)
        ),
    )
}

/// Narrowing question after an oversized result set.
pub fn narrowing_question(
    user_text: &str,
    filters: &FilterSet,
    total_results: usize,
) -> (&'static str, String) {
    (
        NARROW_SYSTEM,
        format!(
            "Total results: {total_results}\nUser request: {user_text}\nCurrent filters (JSON):\n{}",
            filters_json(filters)
        ),
    )
}

fn filters_json(filters: &FilterSet) -> String {
    serde_json::to_string(filters).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use filters::{FilterKey, FilterValue};

    #[test]
    fn test_extraction_prompt_carries_only_the_request() {
        let (system, user) = extraction("thrillers with DiCaprio");
        assert!(system.contains("minified JSON"));
        assert!(system.contains("\"clear\""));
        assert_eq!(user, "User request: thrillers with DiCaprio");
    }

    #[test]
    fn test_narrowing_prompt_includes_total_and_filters() {
        let filters = FilterSet::new()
            .with(FilterKey::Query, FilterValue::Text("disney".to_string()))
            .unwrap();
        let (system, user) = narrowing_question("disney movies", &filters, 42);

        assert!(system.contains("many results"));
        assert!(user.starts_with("Total results: 42\n"));
        assert!(user.contains(r#"{"query":"disney"}"#));
    }

    #[test]
    fn test_clarifying_prompt_with_no_filters() {
        let (system, user) = clarifying_question("xyzzy", &FilterSet::new());
        assert!(system.contains("zero results"));
        assert!(user.ends_with("{}"));
    }
}

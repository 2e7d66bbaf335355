//! Suggested-question payload parsing.
//!
//! The model is asked for a JSON array of questions but may wrap it in a
//! code fence or an object. Anything unusable is a [`RagError::Parse`],
//! which callers absorb by falling back to the localized default list.

use serde::Deserialize;
use tracing::warn;

use clinicbot_types::error::RagError;

use crate::i18n::Catalog;

/// Maximum number of example questions kept on the session.
pub const MAX_QUESTIONS: usize = 4;

#[derive(Deserialize)]
#[serde(untagged)]
enum QuestionsPayload {
    List(Vec<String>),
    Wrapped { questions: Vec<String> },
}

/// Parse a model reply into at most [`MAX_QUESTIONS`] non-empty questions.
pub fn parse_suggested_questions(raw: &str) -> Result<Vec<String>, RagError> {
    let body = strip_code_fence(raw.trim());
    let payload = serde_json::from_str::<QuestionsPayload>(body)
        .ok()
        .or_else(|| extract_array(body).and_then(|a| serde_json::from_str(a).ok()))
        .ok_or_else(|| RagError::Parse(format!("not a JSON question list: {}", preview(raw))))?;

    let list = match payload {
        QuestionsPayload::List(list) => list,
        QuestionsPayload::Wrapped { questions } => questions,
    };

    let questions: Vec<String> = list
        .into_iter()
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .take(MAX_QUESTIONS)
        .collect();

    if questions.is_empty() {
        return Err(RagError::Parse("question list is empty".to_string()));
    }
    Ok(questions)
}

/// Use the remote questions, or the default list when the payload was unusable.
///
/// Only [`RagError::Parse`] is absorbed; other failures are returned.
pub fn questions_or_default(
    result: Result<Vec<String>, RagError>,
    catalog: &Catalog,
) -> Result<Vec<String>, RagError> {
    match result {
        Ok(mut questions) if !questions.is_empty() => {
            questions.truncate(MAX_QUESTIONS);
            Ok(questions)
        }
        Ok(_) => Ok(catalog.default_questions()),
        Err(RagError::Parse(reason)) => {
            warn!(reason = %reason, "Suggested questions unusable, using defaults");
            Ok(catalog.default_questions())
        }
        Err(e) => Err(e),
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string (e.g. "json") on the opening fence line.
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

fn extract_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (end > start).then(|| &text[start..=end])
}

fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(80).collect();
    if text.chars().count() > 80 {
        out.push_str("...");
    }
    out
}

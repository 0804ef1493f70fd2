//! Follow-up question suggestions.
//!
//! After every reply, the exchange asks the model for three questions the
//! visitor might want to ask next. This step is best-effort: whatever goes
//! wrong, the visitor gets [`FALLBACK_SUGGESTIONS`] instead.

use folio_chat_model::{ModelMessage, ModelRequest, ResponseFormat};

/// The maximum number of suggestions returned with a reply.
pub const MAX_SUGGESTIONS: usize = 3;

/// Suggestions used when the model output can't be used.
pub const FALLBACK_SUGGESTIONS: [&str; MAX_SUGGESTIONS] = [
    "Can you tell me more about your experience with AI?",
    "What other projects have you worked on?",
    "What technologies do you specialize in?",
];

/// Returns [`FALLBACK_SUGGESTIONS`] as owned strings.
#[inline]
pub fn fallback_suggestions() -> Vec<String> {
    FALLBACK_SUGGESTIONS.iter().map(|s| s.to_string()).collect()
}

pub(crate) fn suggestion_request(reply: &str) -> ModelRequest {
    let prompt = format!(
        "Based on this conversation context: \"{reply}\"\n\
         Generate {MAX_SUGGESTIONS} relevant follow-up questions that someone might want to ask.\n\
         Return them as a JSON array of strings. Example: [\"question 1\", \"question 2\", \"question 3\"]\n\
         Make the questions natural and contextual."
    );
    ModelRequest {
        messages: vec![ModelMessage::User(prompt)],
        safety_settings: vec![],
        response_format: ResponseFormat::StringList,
    }
}

/// Parses the model output as a JSON array of strings.
///
/// Returns `None` if the output is not such an array. A Markdown code
/// fence around the array is tolerated, blank entries are dropped, and
/// only the first [`MAX_SUGGESTIONS`] entries are kept.
pub fn parse_suggestions(output: &str) -> Option<Vec<String>> {
    let json = strip_code_fence(output.trim());
    let parsed: Vec<String> = serde_json::from_str(json).ok()?;
    Some(
        parsed
            .into_iter()
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .take(MAX_SUGGESTIONS)
            .collect(),
    )
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let Some(rest) = rest.strip_suffix("```") else {
        return text;
    };
    // Skip the info string, e.g. "json".
    match rest.find('\n') {
        Some(idx) => rest[idx + 1..].trim(),
        None => rest
            .trim_start_matches(|c: char| c.is_ascii_alphabetic())
            .trim(),
    }
}

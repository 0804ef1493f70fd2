use folio_chat_model::{
    ErrorKind, HarmBlockThreshold, HarmCategory, ModelFinishReason,
    ModelMessage, ModelRequest, ModelResponse, ResponseFormat, SafetySetting,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::Error;

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Content {
    role: Role,
    parts: Vec<Part>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
struct SafetySettingProto {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    safety_settings: Vec<SafetySettingProto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

// ------------------------------
// Types received from the server
// ------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub message: String,
    pub status: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorDetail,
}

// -----------
// Conversions
// -----------

#[inline]
pub fn create_request(req: &ModelRequest) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: req.messages.iter().map(create_content).collect(),
        safety_settings: req
            .safety_settings
            .iter()
            .map(create_safety_setting)
            .collect(),
        generation_config: match req.response_format {
            ResponseFormat::Text => None,
            ResponseFormat::StringList => Some(GenerationConfig {
                response_mime_type: "application/json",
                response_schema: json!({
                    "type": "ARRAY",
                    "items": { "type": "STRING" }
                }),
            }),
        },
    }
}

#[inline]
fn create_content(msg: &ModelMessage) -> Content {
    let role = match msg {
        ModelMessage::User(_) => Role::User,
        ModelMessage::Assistant(_) => Role::Model,
    };
    Content {
        role,
        parts: vec![Part {
            text: msg.text().to_owned(),
        }],
    }
}

#[inline]
fn create_safety_setting(setting: &SafetySetting) -> SafetySettingProto {
    let category = match setting.category {
        HarmCategory::Harassment => "HARM_CATEGORY_HARASSMENT",
        HarmCategory::HateSpeech => "HARM_CATEGORY_HATE_SPEECH",
        HarmCategory::SexuallyExplicit => "HARM_CATEGORY_SEXUALLY_EXPLICIT",
        HarmCategory::DangerousContent => "HARM_CATEGORY_DANGEROUS_CONTENT",
    };
    let threshold = match setting.threshold {
        HarmBlockThreshold::LowAndAbove => "BLOCK_LOW_AND_ABOVE",
        HarmBlockThreshold::MediumAndAbove => "BLOCK_MEDIUM_AND_ABOVE",
        HarmBlockThreshold::OnlyHigh => "BLOCK_ONLY_HIGH",
        HarmBlockThreshold::NoBlock => "BLOCK_NONE",
    };
    SafetySettingProto {
        category,
        threshold,
    }
}

fn finish_reason(reason: &str) -> ModelFinishReason {
    match reason {
        "STOP" => ModelFinishReason::Stop,
        "MAX_TOKENS" => ModelFinishReason::MaxTokens,
        "SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT"
        | "SPII" => ModelFinishReason::Safety,
        _ => ModelFinishReason::Other,
    }
}

/// Extracts the generated text from a successful HTTP response.
///
/// A blocked prompt or a candidate stopped by the safety filter is
/// reported as a moderation error even though the HTTP call succeeded.
/// Text that came with a safety stop is discarded.
pub fn read_response(resp: GenerateContentResponse) -> Result<ModelResponse, Error> {
    if let Some(reason) = resp
        .prompt_feedback
        .and_then(|feedback| feedback.block_reason)
    {
        return Err(Error::new(
            format!("prompt was blocked by the safety filter ({reason})"),
            ErrorKind::Moderated,
        ));
    }

    let Some(candidate) = resp.candidates.into_iter().next() else {
        return Err(Error::new("response has no candidates", ErrorKind::Other));
    };

    let finish_reason = candidate.finish_reason.as_deref().map(finish_reason);
    if finish_reason == Some(ModelFinishReason::Safety) {
        return Err(Error::new(
            "response was blocked by the safety filter",
            ErrorKind::Moderated,
        ));
    }

    let text = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default();

    Ok(ModelResponse {
        text,
        finish_reason,
    })
}

/// Builds an error from a non-successful HTTP response.
pub fn read_error(status: u16, body: &str) -> Error {
    let detail = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error)
        .ok();
    let message = match &detail {
        Some(detail) if !detail.message.is_empty() => detail.message.as_str(),
        _ => body,
    };
    let exhausted = detail
        .as_ref()
        .and_then(|detail| detail.status.as_deref())
        == Some("RESOURCE_EXHAUSTED");

    let kind = if status == 429 || exhausted {
        ErrorKind::RateLimitExceeded
    } else {
        ErrorKind::Other
    };
    Error::new(format!("Gemini API error ({status}): {message}"), kind)
}

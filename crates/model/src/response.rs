use serde::{Deserialize, Serialize};

/// A complete response from the model provider.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelResponse {
    /// The generated text, exactly as the model produced it.
    pub text: String,
    /// The reason the model stopped generating, if reported.
    pub finish_reason: Option<ModelFinishReason>,
}

impl ModelResponse {
    /// Creates a response that finished normally.
    #[inline]
    pub fn with_text<S: Into<String>>(text: S) -> Self {
        Self {
            text: text.into(),
            finish_reason: Some(ModelFinishReason::Stop),
        }
    }
}

/// The reason why a model response has finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelFinishReason {
    /// The model has finished generating text.
    Stop,
    /// The output was cut at the token limit.
    MaxTokens,
    /// Generation was stopped by a safety filter.
    Safety,
    /// Any other reason reported by the provider.
    Other,
}

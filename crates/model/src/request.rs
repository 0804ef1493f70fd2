use serde::{Deserialize, Serialize};

/// A request to be sent to the model provider.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ModelRequest {
    /// The input messages, oldest first. The last one is the turn the
    /// model should respond to.
    pub messages: Vec<ModelMessage>,
    /// Safety settings to apply. Categories not listed here are left to
    /// the provider defaults.
    pub safety_settings: Vec<SafetySetting>,
    /// The shape of output the caller expects.
    pub response_format: ResponseFormat,
}

/// A complete message.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ModelMessage {
    /// A user input text.
    User(String),
    /// An assistant text. Providers may call this role differently
    /// (e.g. `model`), and they are responsible for the translation.
    Assistant(String),
}

impl ModelMessage {
    /// Returns the text of this message.
    #[inline]
    pub fn text(&self) -> &str {
        match self {
            ModelMessage::User(text) | ModelMessage::Assistant(text) => text,
        }
    }
}

/// The output shape requested from the model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ResponseFormat {
    /// Free-form text.
    #[default]
    Text,
    /// A JSON array of strings. Providers that support structured output
    /// should enforce it, others may ignore this hint.
    StringList,
}

/// A harm category that a safety threshold applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HarmCategory {
    /// Negative or harmful comments targeting identity or protected
    /// attributes.
    Harassment,
    /// Content that is rude, disrespectful, or profane.
    HateSpeech,
    /// Sexually explicit content.
    SexuallyExplicit,
    /// Content that promotes or enables harmful acts.
    DangerousContent,
}

/// The probability level at and above which content is blocked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HarmBlockThreshold {
    /// Block when the probability is low, medium or high.
    LowAndAbove,
    /// Block when the probability is medium or high.
    MediumAndAbove,
    /// Block only when the probability is high.
    OnlyHigh,
    /// Never block.
    NoBlock,
}

/// A safety threshold for one harm category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SafetySetting {
    /// The category this setting applies to.
    pub category: HarmCategory,
    /// The blocking threshold.
    pub threshold: HarmBlockThreshold,
}

impl SafetySetting {
    /// Creates a safety setting.
    #[inline]
    pub fn new(category: HarmCategory, threshold: HarmBlockThreshold) -> Self {
        Self {
            category,
            threshold,
        }
    }
}

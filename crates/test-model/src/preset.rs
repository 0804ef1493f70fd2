use folio_chat_model::ErrorKind;
use serde::{Deserialize, Serialize};

/// The kind of failure a preset reply produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetFailure {
    /// Maps to [`ErrorKind::Moderated`].
    Moderated,
    /// Maps to [`ErrorKind::RateLimitExceeded`].
    RateLimitExceeded,
    /// Maps to [`ErrorKind::Other`].
    Other,
}

impl From<PresetFailure> for ErrorKind {
    #[inline]
    fn from(value: PresetFailure) -> Self {
        match value {
            PresetFailure::Moderated => ErrorKind::Moderated,
            PresetFailure::RateLimitExceeded => ErrorKind::RateLimitExceeded,
            PresetFailure::Other => ErrorKind::Other,
        }
    }
}

/// How the fake model answers one request.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PresetReply {
    /// Replies with the given text.
    #[serde(rename = "text")]
    Text(String),
    /// Fails with the given kind and message.
    #[serde(rename = "failure")]
    Failure {
        /// The kind of the returned error.
        kind: PresetFailure,
        /// The message of the returned error.
        message: String,
    },
}

impl PresetReply {
    /// Creates a successful reply.
    #[inline]
    pub fn text<S: Into<String>>(text: S) -> Self {
        Self::Text(text.into())
    }

    /// Creates a failing reply.
    #[inline]
    pub fn failure<S: Into<String>>(kind: PresetFailure, message: S) -> Self {
        Self::Failure {
            kind,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_deserialize() {
        let replies = vec![
            PresetReply::text("Hello!"),
            PresetReply::failure(
                PresetFailure::RateLimitExceeded,
                "quota exceeded",
            ),
        ];

        let serialized = serde_json::to_string(&replies).unwrap();
        let deserialized: Vec<PresetReply> =
            serde_json::from_str(&serialized).unwrap();

        assert_eq!(replies, deserialized);
    }

    #[test]
    fn test_failure_kind() {
        assert_eq!(ErrorKind::from(PresetFailure::Moderated), ErrorKind::Moderated);
        assert_eq!(ErrorKind::from(PresetFailure::Other), ErrorKind::Other);
    }
}

use std::borrow::Cow;
use std::error::Error;
use std::fmt::{self, Display};

use folio_chat_model::{ErrorKind, ModelProviderError};

/// The kind of error an exchange can end with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExchangeErrorKind {
    /// The transcript was rejected before contacting the provider.
    InvalidTranscript,
    /// The provider is rate limited or out of quota.
    RateLimited,
    /// The provider refused the content.
    SafetyFiltered,
    /// Any other provider or network failure.
    Failed,
}

impl ExchangeErrorKind {
    /// Classifies a provider error by its kind, then by its message.
    pub fn classify(kind: ErrorKind, message: &str) -> Self {
        match kind {
            ErrorKind::RateLimitExceeded => return Self::RateLimited,
            ErrorKind::Moderated => return Self::SafetyFiltered,
            ErrorKind::Other => {}
        }
        let message = message.to_ascii_lowercase();
        if message.contains("quota") {
            ExchangeErrorKind::RateLimited
        } else if message.contains("safety") {
            ExchangeErrorKind::SafetyFiltered
        } else {
            ExchangeErrorKind::Failed
        }
    }
}

impl Display for ExchangeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExchangeErrorKind::InvalidTranscript => {
                write!(f, "Invalid transcript")
            }
            ExchangeErrorKind::RateLimited => write!(f, "Rate limited"),
            ExchangeErrorKind::SafetyFiltered => write!(f, "Safety filtered"),
            ExchangeErrorKind::Failed => write!(f, "Failed"),
        }
    }
}

/// Describes why an exchange failed.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ExchangeError {
    kind: ExchangeErrorKind,
    reason: String,
}

impl ExchangeError {
    #[inline]
    pub(crate) fn invalid_transcript<S: Into<String>>(reason: S) -> Self {
        Self {
            kind: ExchangeErrorKind::InvalidTranscript,
            reason: reason.into(),
        }
    }

    /// Creates an error from a provider error.
    pub fn from_provider(err: &dyn ModelProviderError) -> Self {
        let reason = err.to_string();
        Self {
            kind: ExchangeErrorKind::classify(err.kind(), &reason),
            reason,
        }
    }

    /// Returns the kind of this error.
    #[inline]
    pub fn kind(&self) -> ExchangeErrorKind {
        self.kind
    }

    /// Returns the detailed reason, which may contain provider internals
    /// and should not be shown to visitors.
    #[inline]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Returns the message to show to the visitor.
    pub fn user_message(&self) -> Cow<'static, str> {
        match self.kind {
            ExchangeErrorKind::InvalidTranscript => {
                Cow::Owned(format!("Invalid chat request: {}", self.reason))
            }
            ExchangeErrorKind::RateLimited => Cow::Borrowed(
                "Rate limit exceeded. Please try again in a moment.",
            ),
            ExchangeErrorKind::SafetyFiltered => Cow::Borrowed(
                "Content filtered for safety. Please try a different question.",
            ),
            ExchangeErrorKind::Failed => {
                Cow::Borrowed("Failed to process chat request")
            }
        }
    }
}

impl Display for ExchangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.reason)
    }
}

impl Error for ExchangeError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_message(kind: ErrorKind, reason: &str) -> String {
        ExchangeError {
            kind: ExchangeErrorKind::classify(kind, reason),
            reason: reason.to_owned(),
        }
        .user_message()
        .into_owned()
    }

    #[test]
    fn test_classify() {
        use ExchangeErrorKind::*;

        let cases = [
            (ErrorKind::Other, "check quota", RateLimited),
            (ErrorKind::Other, "Blocked for SAFETY", SafetyFiltered),
            (ErrorKind::Other, "timeout", Failed),
            (ErrorKind::RateLimitExceeded, "", RateLimited),
            (ErrorKind::Moderated, "", SafetyFiltered),
            // Quota wins when both words appear.
            (ErrorKind::Other, "safety quota", RateLimited),
            // The provider's kind wins over the message.
            (ErrorKind::Moderated, "quota check failed", SafetyFiltered),
            (ErrorKind::RateLimitExceeded, "safety", RateLimited),
        ];
        for (kind, message, expected) in cases {
            assert_eq!(
                ExchangeErrorKind::classify(kind, message),
                expected,
                "{kind:?} {message:?}"
            );
        }
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(
            user_message(ErrorKind::Other, "quota"),
            "Rate limit exceeded. Please try again in a moment."
        );
        assert_eq!(
            user_message(ErrorKind::Other, "safety"),
            "Content filtered for safety. Please try a different question."
        );
        assert_eq!(
            user_message(ErrorKind::Other, "boom"),
            "Failed to process chat request"
        );
        assert_eq!(
            ExchangeError::invalid_transcript("the transcript is empty")
                .user_message(),
            "Invalid chat request: the transcript is empty"
        );
    }
}

//! The persona the assistant speaks for.

use folio_chat_model::ModelMessage;

/// The canned reply that follows the preamble in every request.
pub const DEFAULT_ACKNOWLEDGMENT: &str = "I understand. I'll act as HDO's AI assistant and use this information to help visitors.";

/// Facts about the site owner, injected in front of every conversation.
///
/// The persona is sent as two turns: the preamble as a user turn, then the
/// acknowledgment as an assistant turn. Neither is part of the visitor's
/// transcript and neither is ever returned to the client.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Persona {
    preamble: String,
    acknowledgment: String,
}

impl Persona {
    /// Creates a persona with a custom preamble and acknowledgment.
    #[inline]
    pub fn new<P: Into<String>, A: Into<String>>(
        preamble: P,
        acknowledgment: A,
    ) -> Self {
        Self {
            preamble: preamble.into(),
            acknowledgment: acknowledgment.into(),
        }
    }

    /// Creates a persona with a custom preamble and the default
    /// acknowledgment.
    #[inline]
    pub fn with_preamble<P: Into<String>>(preamble: P) -> Self {
        Self::new(preamble, DEFAULT_ACKNOWLEDGMENT)
    }

    /// Returns the preamble.
    #[inline]
    pub fn preamble(&self) -> &str {
        &self.preamble
    }

    /// Returns the acknowledgment.
    #[inline]
    pub fn acknowledgment(&self) -> &str {
        &self.acknowledgment
    }

    pub(crate) fn messages(&self) -> [ModelMessage; 2] {
        [
            ModelMessage::User(self.preamble.clone()),
            ModelMessage::Assistant(self.acknowledgment.clone()),
        ]
    }
}

impl Default for Persona {
    fn default() -> Self {
        Self::with_preamble(include_str!("./persona.md").trim_end())
    }
}

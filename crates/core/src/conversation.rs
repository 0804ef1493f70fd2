//! Conversation-related types.

use folio_chat_model::ModelMessage;

/// Who authored a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// The visitor typing into the chat widget.
    User,
    /// The model answering on behalf of the site owner.
    Assistant,
}

/// A single conversational turn.
///
/// Messages are immutable once created. A transcript is a plain slice or
/// `Vec` of them, where the position encodes the conversational order.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Message {
    /// The author of this message.
    pub role: Role,
    /// The text of this message.
    pub content: String,
}

impl Message {
    /// Creates a user message.
    #[inline]
    pub fn user<S: Into<String>>(content: S) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Creates an assistant message.
    #[inline]
    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

impl From<&Message> for ModelMessage {
    #[inline]
    fn from(msg: &Message) -> Self {
        match msg.role {
            Role::User => ModelMessage::User(msg.content.clone()),
            Role::Assistant => ModelMessage::Assistant(msg.content.clone()),
        }
    }
}

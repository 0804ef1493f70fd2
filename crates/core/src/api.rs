//! JSON bodies exchanged between the conversation client and the chat
//! endpoint.
//!
//! On the wire, assistant turns use the `model` role, which is also what
//! the browser widget sends. `assistant` is accepted as an alias.

use serde::{Deserialize, Serialize};

use crate::ExchangeResult;
use crate::conversation::{Message, Role};

/// The role of a message on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireRole {
    /// A user turn.
    User,
    /// An assistant turn.
    #[serde(alias = "assistant")]
    Model,
}

/// A message on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WireMessage {
    /// The author of the message.
    pub role: WireRole,
    /// The text of the message.
    pub content: String,
}

impl From<&Message> for WireMessage {
    fn from(msg: &Message) -> Self {
        let role = match msg.role {
            Role::User => WireRole::User,
            Role::Assistant => WireRole::Model,
        };
        Self {
            role,
            content: msg.content.clone(),
        }
    }
}

impl From<WireMessage> for Message {
    fn from(msg: WireMessage) -> Self {
        let role = match msg.role {
            WireRole::User => Role::User,
            WireRole::Model => Role::Assistant,
        };
        Self {
            role,
            content: msg.content,
        }
    }
}

/// Body of `POST /api/chat`. The last message is the question to answer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The whole transcript, oldest first.
    pub messages: Vec<WireMessage>,
}

impl ChatRequest {
    /// Builds a request from a transcript.
    pub fn from_transcript(transcript: &[Message]) -> Self {
        Self {
            messages: transcript.iter().map(WireMessage::from).collect(),
        }
    }

    /// Converts the request back into a transcript.
    pub fn into_transcript(self) -> Vec<Message> {
        self.messages.into_iter().map(Message::from).collect()
    }
}

/// Successful body of `POST /api/chat`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The assistant reply.
    pub response: String,
    /// Up to three follow-up questions.
    #[serde(default)]
    pub suggestions: Vec<String>,
}

impl From<ExchangeResult> for ChatResponse {
    #[inline]
    fn from(result: ExchangeResult) -> Self {
        Self {
            response: result.reply,
            suggestions: result.suggestions,
        }
    }
}

/// Failure body of every endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// A message that can be shown to the visitor.
    pub error: String,
}

//! The visitor side of the portfolio chat.
//!
//! [`ConversationClient`] keeps the transcript the way the chat widget
//! does: it appends the visitor's message right away, sends the whole
//! transcript through a [`Transport`], and appends the reply when it
//! arrives. A terminal front-end is available behind the `cli` feature.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod client;
pub mod transport;

pub use client::{
    ClientClosedError, ClientSnapshot, ConversationClient,
    ConversationClientBuilder, FAILURE_NOTIFICATION,
};
pub use transport::{HttpTransport, Transport, TransportError};

/// Re-exports of [`folio_chat_core`] crate.
pub mod core {
    pub use folio_chat_core::*;
}

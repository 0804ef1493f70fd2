//! Core logic of the portfolio chat: conversation types, the persona
//! preamble, and the exchange that turns a transcript into a reply plus
//! follow-up suggestions.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

pub mod api;
pub mod conversation;
mod exchange;
mod model_client;
pub mod persona;
pub mod suggestions;

pub use exchange::{
    DEFAULT_TIMEOUT, ExchangeError, ExchangeErrorKind, ExchangeResult,
    ExchangeService, ExchangeServiceBuilder,
};

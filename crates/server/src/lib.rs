//! HTTP front of the portfolio chat.
//!
//! Exposes `POST /api/chat`, which answers a transcript through the
//! [`ExchangeService`](folio_chat_core::ExchangeService), and `GET /health`.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;

//! An abstraction layer for generative-model providers.
//!
//! This crate establishes the protocol the chat exchange uses to talk to
//! a hosted model, so that the exchange logic never depends on the wire
//! format or the role vocabulary of one particular vendor.
//!
//! Types in this crate don't define any behavior, instead they are the
//! constraints that the implementors should adhere to.

#![deny(missing_docs)]

mod error;
mod provider;
mod request;
mod response;

pub use error::*;
pub use provider::*;
pub use request::*;
pub use response::*;

//! Shared state of the handlers.

use std::sync::Arc;

use folio_chat_core::ExchangeService;

/// State cloned into every request.
#[derive(Clone)]
pub struct AppState {
    /// Answers the transcripts.
    pub exchange: Arc<ExchangeService>,
}

impl AppState {
    /// Creates the state around an exchange service.
    pub fn new(exchange: ExchangeService) -> Self {
        Self {
            exchange: Arc::new(exchange),
        }
    }
}

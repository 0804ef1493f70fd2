use std::time::Duration;

use folio_chat_model::{
    HarmBlockThreshold, HarmCategory, ModelProvider, SafetySetting,
};

use super::ExchangeService;
use crate::model_client::ModelClient;
use crate::persona::Persona;

/// The default limit for each model request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// [`ExchangeService`] builder.
pub struct ExchangeServiceBuilder {
    model_client: ModelClient,
    persona: Persona,
    safety_settings: Vec<SafetySetting>,
    timeout: Option<Duration>,
}

impl ExchangeServiceBuilder {
    /// Creates a new builder with the specified model provider.
    ///
    /// By default the built-in persona is used, harassment is blocked at
    /// medium probability and above, and each model request times out
    /// after 30 seconds.
    #[inline]
    pub fn with_model_provider<P: ModelProvider + 'static>(
        provider: P,
    ) -> Self {
        Self {
            model_client: ModelClient::new(provider),
            persona: Persona::default(),
            safety_settings: vec![SafetySetting::new(
                HarmCategory::Harassment,
                HarmBlockThreshold::MediumAndAbove,
            )],
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }

    /// Sets the persona.
    #[inline]
    pub fn with_persona(mut self, persona: Persona) -> Self {
        self.persona = persona;
        self
    }

    /// Replaces the safety settings of the reply request.
    #[inline]
    pub fn with_safety_settings(
        mut self,
        safety_settings: impl Into<Vec<SafetySetting>>,
    ) -> Self {
        self.safety_settings = safety_settings.into();
        self
    }

    /// Sets the per-request timeout. `None` waits indefinitely.
    #[inline]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the service.
    #[inline]
    pub fn build(self) -> ExchangeService {
        ExchangeService {
            model_client: self.model_client.with_timeout(self.timeout),
            persona: self.persona,
            safety_settings: self.safety_settings,
        }
    }
}

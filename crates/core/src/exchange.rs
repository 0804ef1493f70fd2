mod builder;
mod error;

use folio_chat_model::{ModelMessage, ModelRequest, ResponseFormat, SafetySetting};

use crate::conversation::{Message, Role};
use crate::model_client::ModelClient;
use crate::persona::Persona;
use crate::suggestions::{fallback_suggestions, parse_suggestions, suggestion_request};
pub use builder::{DEFAULT_TIMEOUT, ExchangeServiceBuilder};
pub use error::{ExchangeError, ExchangeErrorKind};

/// The outcome of a successful exchange.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ExchangeResult {
    /// The assistant reply, verbatim.
    pub reply: String,
    /// Up to three follow-up questions.
    pub suggestions: Vec<String>,
}

/// Answers a transcript with a reply and follow-up suggestions.
///
/// The service holds no per-conversation state: every call to
/// [`exchange`](Self::exchange) is independent, so one instance can be
/// shared by all request handlers.
pub struct ExchangeService {
    model_client: ModelClient,
    persona: Persona,
    safety_settings: Vec<SafetySetting>,
}

impl ExchangeService {
    /// Answers the last message of `transcript`.
    ///
    /// The last message must be a non-blank user turn; everything before
    /// it is sent as history after the persona preamble. Two sequential
    /// model requests are made: one for the reply and one for the
    /// suggestions. Only the first one can fail the exchange.
    pub async fn exchange(
        &self,
        transcript: &[Message],
    ) -> Result<ExchangeResult, ExchangeError> {
        let request = self.build_request(transcript)?;
        debug!("answering a transcript of {} messages", transcript.len());

        let reply = match self.model_client.send_request(request).await {
            Ok(resp) => resp.text,
            Err(err) => {
                let err = ExchangeError::from_provider(&*err);
                warn!("exchange failed: {err}");
                return Err(err);
            }
        };

        let suggestions = self.suggest(&reply).await;
        Ok(ExchangeResult { reply, suggestions })
    }

    fn build_request(
        &self,
        transcript: &[Message],
    ) -> Result<ModelRequest, ExchangeError> {
        let Some(last) = transcript.last() else {
            return Err(ExchangeError::invalid_transcript(
                "the transcript is empty",
            ));
        };
        if last.role != Role::User {
            return Err(ExchangeError::invalid_transcript(
                "the last message must come from the user",
            ));
        }
        if last.content.trim().is_empty() {
            return Err(ExchangeError::invalid_transcript(
                "the last message is empty",
            ));
        }

        let messages = self
            .persona
            .messages()
            .into_iter()
            .chain(transcript.iter().map(ModelMessage::from))
            .collect();
        Ok(ModelRequest {
            messages,
            safety_settings: self.safety_settings.clone(),
            response_format: ResponseFormat::Text,
        })
    }

    /// Asks the model for follow-up questions. Never fails.
    async fn suggest(&self, reply: &str) -> Vec<String> {
        let request = suggestion_request(reply);
        let output = match self.model_client.send_request(request).await {
            Ok(resp) => resp.text,
            Err(err) => {
                warn!("suggestion request failed, using fallback: {err}");
                return fallback_suggestions();
            }
        };
        parse_suggestions(&output).unwrap_or_else(|| {
            warn!("unparsable suggestions, using fallback: {output:?}");
            fallback_suggestions()
        })
    }
}

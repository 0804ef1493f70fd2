//! A local fake model for testing purpose.

mod preset;

use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt::{self, Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use folio_chat_model::{
    ErrorKind, ModelProvider, ModelProviderError, ModelRequest, ModelResponse,
};
use tokio::time::sleep;

pub use preset::*;

#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for Error {}

impl ModelProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

#[derive(Default)]
struct Script {
    replies: VecDeque<PresetReply>,
    requests: Vec<ModelRequest>,
}

/// A local fake model for testing purpose.
///
/// Before sending requests, you need to set up the script, which is how
/// the model should answer each request, in order. Every request is
/// recorded and can be inspected afterwards. If there are no replies left
/// in the script, an error will be returned.
///
/// Clones share the same script, so a clone can be handed to the code
/// under test while the original is kept for assertions.
#[derive(Clone, Default)]
pub struct TestModelProvider {
    script: Arc<Mutex<Script>>,
    delay: Option<Duration>,
}

impl TestModelProvider {
    #[inline]
    pub fn add_reply(&mut self, reply: PresetReply) {
        self.script().replies.push_back(reply);
    }

    #[inline]
    pub fn add_text_reply<S: Into<String>>(&mut self, text: S) {
        self.add_reply(PresetReply::text(text));
    }

    #[inline]
    pub fn add_failure<S: Into<String>>(
        &mut self,
        kind: PresetFailure,
        message: S,
    ) {
        self.add_reply(PresetReply::failure(kind, message));
    }

    #[inline]
    pub fn set_delay(&mut self, duration: Duration) {
        self.delay = Some(duration);
    }

    /// Returns all the requests received so far.
    #[inline]
    pub fn requests(&self) -> Vec<ModelRequest> {
        self.script().requests.clone()
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        // A panicking test thread may poison the lock, the script itself
        // is still usable.
        self.script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ModelProvider for TestModelProvider {
    type Error = crate::Error;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<ModelResponse, Self::Error>> + Send + 'static
    {
        let reply = {
            let mut script = self.script();
            script.requests.push(req.clone());
            script.replies.pop_front()
        };
        let delay = self.delay;

        async move {
            if let Some(delay) = delay {
                sleep(delay).await;
            }
            match reply {
                Some(PresetReply::Text(text)) => Ok(ModelResponse::with_text(text)),
                Some(PresetReply::Failure { kind, message }) => Err(Error {
                    message,
                    kind: kind.into(),
                }),
                None => Err(Error {
                    message: "no enough replies".to_owned(),
                    kind: ErrorKind::Other,
                }),
            }
        }
    }
}

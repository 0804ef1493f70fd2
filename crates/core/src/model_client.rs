use std::error::Error;
use std::fmt::{self, Display};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use folio_chat_model::{
    ErrorKind, ModelProvider, ModelProviderError, ModelRequest, ModelResponse,
};
use tokio::time::timeout;
use tracing::Instrument;

pub(crate) type SendRequestResult =
    Result<ModelResponse, Box<dyn ModelProviderError>>;
type BoxedSendRequestFuture =
    Pin<Box<dyn Future<Output = SendRequestResult> + Send>>;
type HandlerFn = Arc<dyn Fn(ModelRequest) -> BoxedSendRequestFuture + Send + Sync>;

/// A wrapper around a model provider that provides a type-erased
/// interface for the other modules, and bounds every request with an
/// optional timeout.
#[derive(Clone)]
pub struct ModelClient {
    handler_fn: HandlerFn,
    timeout: Option<Duration>,
}

impl ModelClient {
    #[inline]
    pub fn new<P: ModelProvider + 'static>(provider: P) -> Self {
        // We have to erase the type `P`, since `ModelClient` doesn't have a
        // generic parameter and we don't want it either.
        let handler_fn: HandlerFn = Arc::new(move |req| {
            let fut = provider.send_request(&req);
            Box::pin(
                async move {
                    trace!("got a request: {:?}", req);
                    match fut.await {
                        Ok(resp) => {
                            trace!("finished a request");
                            Ok(resp)
                        }
                        Err(err) => {
                            debug!("got an error: {err:?}");
                            Err(Box::new(err) as Box<dyn ModelProviderError>)
                        }
                    }
                }
                .instrument(trace_span!("model client req")),
            )
        });
        Self {
            handler_fn,
            timeout: None,
        }
    }

    #[inline]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sends a request and waits for the complete response.
    ///
    /// # Cancel safety
    ///
    /// This method is cancel safe. Dropping the future drops the
    /// underlying provider request.
    pub async fn send_request(&self, req: ModelRequest) -> SendRequestResult {
        let fut = (self.handler_fn)(req);
        let Some(limit) = self.timeout else {
            return fut.await;
        };
        match timeout(limit, fut).await {
            Ok(result) => result,
            Err(_) => {
                debug!("request timed out after {limit:?}");
                Err(Box::new(TimeoutError(limit)))
            }
        }
    }
}

/// The provider did not answer within the configured limit.
#[derive(Debug)]
struct TimeoutError(Duration);

impl Display for TimeoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "model request timed out after {:?}", self.0)
    }
}

impl Error for TimeoutError {}

impl ModelProviderError for TimeoutError {
    #[inline]
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

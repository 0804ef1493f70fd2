//! How transcripts reach the chat server.

use std::error::Error;
use std::fmt::{self, Display};
use std::sync::Arc;

use folio_chat_core::api::{ChatRequest, ChatResponse, ErrorResponse};
use reqwest::{Client, header};

/// Sends a chat request and waits for its answer.
pub trait Transport: Send + Sync {
    /// Sends `request` to the chat server.
    ///
    /// The returned future must not borrow `self`, so that the client can
    /// run it in its own task.
    fn send(
        &self,
        request: ChatRequest,
    ) -> impl Future<Output = Result<ChatResponse, TransportError>> + Send + 'static;
}

/// A failed round-trip to the chat server.
#[derive(Clone, Debug)]
pub struct TransportError {
    message: String,
    status: Option<u16>,
}

impl TransportError {
    /// Creates an error that did not come with an HTTP status.
    #[inline]
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }

    /// Creates an error from a non-success HTTP response.
    #[inline]
    pub fn with_status<S: Into<String>>(status: u16, message: S) -> Self {
        Self {
            message: message.into(),
            status: Some(status),
        }
    }

    /// Returns the HTTP status, if the server answered at all.
    #[inline]
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Returns the message of the error.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "server answered {status}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl Error for TransportError {}

/// A transport that posts JSON to the chat endpoint over HTTP.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
    url: Arc<str>,
}

impl HttpTransport {
    /// Creates a transport for the endpoint at `url`, usually ending with
    /// `/api/chat`.
    #[inline]
    pub fn new<S: AsRef<str>>(url: S) -> Self {
        Self {
            client: Client::new(),
            url: Arc::from(url.as_ref()),
        }
    }

    /// Returns the endpoint URL.
    #[inline]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Transport for HttpTransport {
    fn send(
        &self,
        request: ChatRequest,
    ) -> impl Future<Output = Result<ChatResponse, TransportError>> + Send + 'static
    {
        let resp_fut = self
            .client
            .post(&*self.url)
            .header(header::ACCEPT, "application/json")
            .json(&request)
            .send();

        async move {
            let resp = resp_fut
                .await
                .map_err(|err| TransportError::new(format!("{err}")))?;

            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ErrorResponse>(&body)
                    .map(|body| body.error)
                    .unwrap_or_else(|_| status.to_string());
                debug!("chat request failed with {status}: {message}");
                return Err(TransportError::with_status(status.as_u16(), message));
            }

            resp.json::<ChatResponse>()
                .await
                .map_err(|err| TransportError::new(format!("{err}")))
        }
    }
}

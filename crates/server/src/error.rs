//! Failures of the API and their HTTP rendering.

use std::fmt::{self, Display};

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use folio_chat_core::api::ErrorResponse;
use folio_chat_core::{ExchangeError, ExchangeErrorKind};

/// A failed API call.
#[derive(Debug)]
pub enum ApiError {
    /// The body could not be read as a chat request.
    BadRequest(String),
    /// The exchange failed.
    Exchange(ExchangeError),
}

impl ApiError {
    /// Returns the HTTP status of the failure.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Exchange(err) => match err.kind() {
                ExchangeErrorKind::InvalidTranscript => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Returns the message shown to the visitor.
    pub fn user_message(&self) -> String {
        match self {
            Self::BadRequest(reason) => format!("Invalid chat request: {reason}"),
            Self::Exchange(err) => err.user_message().into_owned(),
        }
    }
}

impl From<ExchangeError> for ApiError {
    #[inline]
    fn from(err: ExchangeError) -> Self {
        Self::Exchange(err)
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadRequest(reason) => write!(f, "bad request: {reason}"),
            Self::Exchange(err) => Display::fmt(err, f),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("chat request failed: {self}");
        } else {
            debug!("rejected chat request: {self}");
        }
        let body = ErrorResponse {
            error: self.user_message(),
        };
        (status, Json(body)).into_response()
    }
}

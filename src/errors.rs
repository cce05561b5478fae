//! Errors surfaced to submission callers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Everything that can go wrong while accepting a submission. Each
/// variant maps to a fixed status code and error body; the `Display`
/// text is the body's `error` field verbatim.
///
/// A parameter-store failure is reported as `Unauthorized`, the same
/// as a token mismatch, so callers cannot probe the store's
/// availability through this endpoint.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    /// The body isn't a JSON object carrying a string `token` and an
    /// object `data`.
    #[error("Missing 'token' or 'data' in request")]
    MalformedRequest,

    /// The supplied token doesn't match the stored one, or the stored
    /// one couldn't be fetched.
    #[error("Invalid token")]
    Unauthorized,

    /// `data.email_timestream` is present but not renderable as a
    /// calendar timestamp.
    #[error("Invalid 'email_timestream'")]
    InvalidField,

    /// The queue rejected the message; the caller should retry.
    #[error("Failed to send message to SQS")]
    DownstreamUnavailable,
}

impl SubmitError {
    /// The status code this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            SubmitError::MalformedRequest => StatusCode::BAD_REQUEST,
            SubmitError::Unauthorized => StatusCode::FORBIDDEN,
            SubmitError::InvalidField => StatusCode::BAD_REQUEST,
            SubmitError::DownstreamUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for SubmitError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

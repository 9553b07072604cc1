//! HTTP error responses.
//!
//! Every failure is rendered as `{"error": "<message>"}` with a fixed message
//! per variant; underlying causes are logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Errors returned by the HTTP handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("Missing API key")]
    MissingApiKey,

    #[error("Invalid API key")]
    InvalidApiKey,

    /// No connected account, or no usable provider token.
    #[error("Missing access token")]
    MissingAccessToken,

    #[error("Invalid query parameters")]
    InvalidQuery,

    #[error("Email account not found")]
    AccountNotFound,

    #[error("Failed to retrieve emails")]
    RetrievalFailed,

    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn status(self) -> StatusCode {
        match self {
            ApiError::MissingApiKey | ApiError::InvalidApiKey | ApiError::MissingAccessToken => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::InvalidQuery | ApiError::AccountNotFound => StatusCode::BAD_REQUEST,
            ApiError::RetrievalFailed | ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

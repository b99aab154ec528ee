use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::{ai::AiError, storage::StorageError};

/// Message returned whenever a request lacks a usable credential.
pub const AUTH_REQUIRED: &str = "Authentication required";

/// ApiError
///
/// Every failure an API handler can report. Renders as `{"error": "<message>"}`
/// with the matching status; internal causes are logged, never echoed.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(&'static str),

    /// Missing, malformed, forged or expired credential. One message for all.
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    NotFound(&'static str),

    /// The AI service refused or could not be reached; the message names the
    /// operation that failed.
    #[error("{message}")]
    Upstream {
        message: &'static str,
        #[source]
        source: AiError,
    },

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("token encoding failed: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

impl ApiError {
    pub fn upstream(message: &'static str, source: AiError) -> Self {
        ApiError::Upstream { message, source }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.to_string()),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, AUTH_REQUIRED.to_string()),
            ApiError::InvalidCredentials => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.to_string()),
            ApiError::Upstream { message, source } => {
                tracing::error!(error = %source, "AI service call failed");
                (StatusCode::INTERNAL_SERVER_ERROR, message.to_string())
            }
            ApiError::Database(_)
            | ApiError::Storage(_)
            | ApiError::Token(_) => {
                tracing::error!(error = %self, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

use axum::{
    extract::multipart::MultipartRejection,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Message shown to end users whenever the model could not produce a usable
/// reply. Provider details stay in the logs.
pub const ASSISTANT_UNAVAILABLE: &str =
    "The assistant is temporarily unavailable. Please try again.";

const INTERNAL_ERROR: &str = "Something went wrong on our side. Please try again.";

/// Failure of a single assistant request. Every variant is terminal; nothing
/// is retried.
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Model unavailable: {0}")]
    ModelUnavailable(#[from] hub_llm::LanguageModelError),
    #[error("Malformed reply: {0}")]
    MalformedReply(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Store JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error returned by HTTP handlers. Each variant maps to one status code and a
/// `{ "message": ... }` body.
#[derive(Debug, Error)]
pub enum HubError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Assistant(#[from] AssistantError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl HubError {
    fn from_rejection(status: StatusCode, text: String) -> Self {
        if status.is_server_error() {
            Self::Internal(text)
        } else {
            Self::BadRequest(text)
        }
    }
}

impl From<JsonRejection> for HubError {
    fn from(rejection: JsonRejection) -> Self {
        Self::from_rejection(rejection.status(), rejection.body_text())
    }
}

impl From<PathRejection> for HubError {
    fn from(rejection: PathRejection) -> Self {
        Self::from_rejection(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartRejection> for HubError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::from_rejection(rejection.status(), rejection.body_text())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for HubError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message),
            Self::Forbidden(message) => (StatusCode::FORBIDDEN, message),
            Self::NotFound(message) => (StatusCode::NOT_FOUND, message),
            Self::Conflict(message) => (StatusCode::CONFLICT, message),
            Self::Assistant(AssistantError::InvalidRequest(message)) => {
                (StatusCode::BAD_REQUEST, message)
            }
            // Already logged where the model call failed.
            Self::Assistant(AssistantError::ModelUnavailable(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ASSISTANT_UNAVAILABLE.to_string(),
            ),
            Self::Assistant(error) => {
                tracing::error!(%error, "assistant reply rejected");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ASSISTANT_UNAVAILABLE.to_string(),
                )
            }
            Self::Store(error) => {
                tracing::error!(%error, "store operation failed");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR.to_string())
            }
            Self::Internal(error) => {
                tracing::error!(%error, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR.to_string())
            }
        };

        (status, Json(ErrorBody { message })).into_response()
    }
}

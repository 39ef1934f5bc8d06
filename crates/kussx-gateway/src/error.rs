use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use kussx_core::ShortenerError;
use serde::Serialize;
use tracing::error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Failures of a request, as the client gets to see them.
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound,
    /// Details are logged, never sent.
    Internal(String),
}

impl From<ShortenerError> for AppError {
    fn from(err: ShortenerError) -> Self {
        match err {
            ShortenerError::Validation(message) => AppError::BadRequest(message),
            ShortenerError::NotFound(_) => AppError::NotFound,
            err @ (ShortenerError::KeyCollision(_)
            | ShortenerError::AllocationExhausted { .. }
            | ShortenerError::Storage(_)) => AppError::Internal(err.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound => (StatusCode::NOT_FOUND, "short key not found".to_string()),
            AppError::Internal(detail) => {
                error!(error = %detail, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use stubby_core::{CoreError, ShortenerError};
use thiserror::Error;
use tracing::error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Shortener(#[from] ShortenerError),

    /// A path segment that cannot be a short code; no mapping can match it.
    #[error(transparent)]
    MalformedShortCode(#[from] CoreError),

    #[error("invalid request body: {0}")]
    InvalidBody(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::InvalidQuery(rejection.body_text())
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Shortener(ShortenerError::NotFound(_)) | AppError::MalformedShortCode(_) => {
                StatusCode::NOT_FOUND
            }
            AppError::Shortener(ShortenerError::InvalidPage(_))
            | AppError::InvalidBody(_)
            | AppError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            AppError::Shortener(
                ShortenerError::RetryLimitExceeded { .. } | ShortenerError::Storage(_),
            ) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match &self {
            AppError::Shortener(ShortenerError::Storage(err)) => {
                error!(error = %err, "storage failure");
                "internal storage error".to_string()
            }
            other => {
                if status.is_server_error() {
                    error!(error = %other, "request failed");
                }
                other.to_string()
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

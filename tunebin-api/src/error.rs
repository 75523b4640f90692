//! HTTP error mapping
//!
//! Every failure leaves the service as `{"message": "..."}` with the status
//! of its category: validation 400, not found 404, persistence 500.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tunebin_common::db::songs::SONG_NOT_FOUND;

use crate::files::FileStoreError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or missing request input (400)
    #[error("{0}")]
    Validation(String),

    /// Referenced song does not exist (404)
    #[error("{0}")]
    NotFound(String),

    /// Storage failure (500)
    #[error("{0}")]
    Persistence(String),
}

impl ApiError {
    pub fn song_not_found() -> Self {
        ApiError::NotFound(SONG_NOT_FOUND.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<tunebin_common::Error> for ApiError {
    fn from(err: tunebin_common::Error) -> Self {
        match err {
            tunebin_common::Error::NotFound(msg) => ApiError::NotFound(msg),
            other => ApiError::Persistence(other.to_string()),
        }
    }
}

impl From<FileStoreError> for ApiError {
    fn from(err: FileStoreError) -> Self {
        match &err {
            FileStoreError::Io(_) => ApiError::Persistence(err.to_string()),
            FileStoreError::InvalidFilename(_) | FileStoreError::FileTooLarge(..) => {
                ApiError::Validation(err.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

//! API error types with HTTP status code mapping.
//!
//! [`ApiError`] is the unified error type for all API endpoints. It implements
//! `axum::response::IntoResponse` to produce structured JSON error responses
//! with appropriate HTTP status codes and a machine-stable `code`.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use blocklab_storage::StorageError;

/// Structured error detail in API responses.
#[derive(Debug, Clone, Serialize)]
pub struct ApiErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "BAD_REQUEST").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// API errors with HTTP status code mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Entity not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Missing or invalid input (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Malformed project key (400).
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// The project store failed or could not be reached (500).
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Internal server error (500).
    #[error("internal error: {0}")]
    InternalError(String),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::InvalidIdentifier(_) => (StatusCode::BAD_REQUEST, "INVALID_IDENTIFIER"),
            ApiError::StoreUnavailable(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "STORE_UNAVAILABLE")
            }
            ApiError::InternalError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    fn message(&self) -> &str {
        match self {
            ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::InvalidIdentifier(msg)
            | ApiError::StoreUnavailable(msg)
            | ApiError::InternalError(msg) => msg,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let detail = ApiErrorDetail {
            code: code.to_string(),
            message: self.message().to_string(),
        };

        let body = serde_json::json!({
            "success": false,
            "error": detail,
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Validation(msg) => ApiError::BadRequest(msg),
            StorageError::InvalidIdentifier(_) => {
                ApiError::InvalidIdentifier("Invalid project ID format".to_string())
            }
            StorageError::NotFound(_) => ApiError::NotFound("Project not found".to_string()),
            other if other.is_unavailable() => {
                tracing::error!(error = %other, "project store failure");
                ApiError::StoreUnavailable("Project store unavailable".to_string())
            }
            other => {
                tracing::error!(error = %other, "unclassified storage error");
                ApiError::InternalError("Internal server error".to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blocklab_storage::ProjectId;

    #[test]
    fn storage_errors_map_to_stable_codes() {
        let cases = [
            (
                ApiError::from(StorageError::Validation("x".into())),
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
            ),
            (
                ApiError::from(StorageError::InvalidIdentifier("zz".into())),
                StatusCode::BAD_REQUEST,
                "INVALID_IDENTIFIER",
            ),
            (
                ApiError::from(StorageError::NotFound(ProjectId::new_v4())),
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
            ),
            (
                ApiError::from(StorageError::Migration("bad".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORE_UNAVAILABLE",
            ),
        ];
        for (err, status, code) in cases {
            assert_eq!(err.status_and_code(), (status, code));
        }
    }

    #[test]
    fn backend_details_are_not_leaked() {
        let err = ApiError::from(StorageError::Corrupt {
            reason: "secret row".into(),
        });
        assert!(!err.message().contains("secret"));
    }
}

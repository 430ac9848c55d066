//! API error taxonomy and HTTP status mapping.
//!
//! Handlers catch at the boundary only: any failure below them is fatal
//! to that request and reported. Internal detail is logged at the
//! conversion site and never sent to the client.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::db::{DbLockError, StoreError};

#[derive(Debug)]
pub enum ApiError {
    /// Requested record does not exist for this identity/key
    NotFound,
    /// Update rejected or request body unusable
    BadRequest(String),
    /// Missing, unknown, or expired session credential
    Unauthorized,
    /// Store or infrastructure failure; detail stays in the logs
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::NotFound => "not found".to_string(),
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::Unauthorized => "authentication required".to_string(),
            ApiError::Internal => "internal server error".to_string(),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.message() }))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Rejected(msg) => ApiError::BadRequest(msg),
            other => {
                tracing::error!("Store failure: {}", other);
                ApiError::Internal
            }
        }
    }
}

impl From<DbLockError> for ApiError {
    fn from(_: DbLockError) -> Self {
        ApiError::Internal
    }
}

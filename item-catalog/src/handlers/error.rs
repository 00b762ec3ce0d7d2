//! API error types for handler operations
//!
//! Every failure a handler can produce is an [`ApiError`]. Its kind fixes both
//! the HTTP status and the public message; internal detail is logged, never
//! returned.
//!
//! # Example
//!
//! ```rust
//! use item_catalog::handlers::{ApiError, ApiErrorKind};
//! use item_catalog::usecase::ItemError;
//!
//! let error = ApiError::from(ItemError::NotFound);
//! assert_eq!(error.kind, ApiErrorKind::NotFound);
//! assert_eq!(error.kind.status_code().as_u16(), 404);
//! ```

use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::usecase::{ItemError, ItemErrorKind};

/// Category of API error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    /// Path identifier is not an integer
    InvalidId,
    /// Body could not be decoded
    InvalidRequest,
    /// Item does not exist
    NotFound,
    /// Entity invariants rejected the input
    ValidationFailed,
    /// Request deadline elapsed
    Timeout,
    /// Request was cancelled
    Cancelled,
    /// Storage or other internal failure
    InternalError,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "invalid_id"),
            Self::InvalidRequest => write!(f, "invalid_request"),
            Self::NotFound => write!(f, "not_found"),
            Self::ValidationFailed => write!(f, "validation_failed"),
            Self::Timeout => write!(f, "timeout"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::InternalError => write!(f, "internal_error"),
        }
    }
}

impl ApiErrorKind {
    /// Get the HTTP status code for this error kind
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidId | Self::InvalidRequest | Self::ValidationFailed => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
            Self::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message returned in the `error` field
    #[must_use]
    pub const fn public_message(&self) -> &'static str {
        match self {
            Self::InvalidId => "invalid item ID",
            Self::InvalidRequest => "invalid request format",
            Self::NotFound => "item not found",
            Self::ValidationFailed => "validation failed",
            Self::Timeout => "request timed out",
            Self::Cancelled => "request cancelled",
            Self::InternalError => "internal server error",
        }
    }
}

/// Structured API error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// The category of error
    pub kind: ApiErrorKind,
    /// Client-facing details; only validation failures carry any
    pub details: Vec<String>,
    /// Internal description, logged but not returned
    pub message: String,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            details: Vec::new(),
            message: message.into(),
        }
    }

    pub fn invalid_id(raw: &str) -> Self {
        Self::new(ApiErrorKind::InvalidId, format!("cannot parse {:?} as item id", raw))
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::InvalidRequest, message)
    }

    #[must_use]
    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "API {} error: {}", self.kind, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Response body for API errors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.kind.status_code();

        if status.is_server_error() {
            tracing::error!(kind = %self.kind, status = status.as_u16(), "API error: {}", self.message);
        } else {
            tracing::debug!(kind = %self.kind, status = status.as_u16(), "API error: {}", self.message);
        }

        let body = ErrorResponse {
            error: self.kind.public_message().to_string(),
            details: self.details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ItemError> for ApiError {
    fn from(err: ItemError) -> Self {
        let kind = match err.kind() {
            ItemErrorKind::NotFound => ApiErrorKind::NotFound,
            ItemErrorKind::InvalidInput => ApiErrorKind::ValidationFailed,
            ItemErrorKind::Timeout => ApiErrorKind::Timeout,
            ItemErrorKind::Cancelled => ApiErrorKind::Cancelled,
            ItemErrorKind::Storage => ApiErrorKind::InternalError,
        };

        let message = err.to_string();
        let details = match err {
            ItemError::InvalidInput { message } => vec![message],
            _ => Vec::new(),
        };

        Self::new(kind, message).with_details(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{RepositoryError, RepositoryErrorKind, RepositoryOperation};
    use http_body_util::BodyExt;
    use rstest::rstest;

    async fn body_of(error: ApiError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[rstest]
    #[case(ItemError::NotFound, StatusCode::NOT_FOUND, "item not found")]
    #[case(ItemError::Timeout, StatusCode::GATEWAY_TIMEOUT, "request timed out")]
    #[case(ItemError::Cancelled, StatusCode::SERVICE_UNAVAILABLE, "request cancelled")]
    #[tokio::test]
    async fn test_item_error_mapping(
        #[case] err: ItemError,
        #[case] status: StatusCode,
        #[case] message: &str,
    ) {
        let (got_status, body) = body_of(ApiError::from(err)).await;
        assert_eq!(got_status, status);
        assert_eq!(body["error"], message);
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn test_invalid_input_carries_details() {
        let (status, body) = body_of(ApiError::from(ItemError::invalid_input(
            "name must not be empty",
        )))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            serde_json::json!({"error": "validation failed", "details": ["name must not be empty"]})
        );
    }

    #[tokio::test]
    async fn test_storage_error_hides_internal_detail() {
        let repo = RepositoryError::new(
            RepositoryOperation::FindAll,
            RepositoryErrorKind::DatabaseError,
            "no such table: items",
        );
        let (status, body) = body_of(ApiError::from(ItemError::from(repo))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({"error": "internal server error"}));
    }

    #[test]
    fn test_malformed_input_kinds_are_bad_request() {
        assert_eq!(
            ApiError::invalid_id("abc").kind.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::invalid_request("EOF").kind.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiErrorKind::InvalidId.public_message(), "invalid item ID");
        assert_eq!(
            ApiErrorKind::InvalidRequest.public_message(),
            "invalid request format"
        );
    }
}

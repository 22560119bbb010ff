//! API Error Types
//!
//! Defines error types for the API layer and implements conversion
//! to HTTP responses with appropriate status codes.

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::api::dto::MessageResponse;
use crate::readings::ReadingsError;
use crate::store::StoreError;

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request validation failed; the message is returned verbatim
    #[error("{0}")]
    Validation(String),

    /// Resource not found
    #[error("{0}")]
    NotFound(String),

    /// Store layer error
    #[error("Store error: {0}")]
    Store(StoreError),

    /// Readings source failed or was unreachable
    #[error("{0}")]
    Upstream(ReadingsError),

    /// Request exceeded `[api] request_timeout_secs`
    #[error("Request timed out")]
    Timeout,

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(message) => ApiError::Validation(message),
            other => ApiError::Store(other),
        }
    }
}

impl From<ReadingsError> for ApiError {
    fn from(err: ReadingsError) -> Self {
        match err {
            ReadingsError::InvalidLocator | ReadingsError::DisallowedSource(_) => {
                ApiError::Validation(err.to_string())
            }
            other => ApiError::Upstream(other),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Timeout => StatusCode::REQUEST_TIMEOUT,
            ApiError::Store(_) | ApiError::Internal(_) | ApiError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Store(_) => "STORE_ERROR",
            ApiError::Upstream(_) => "UPSTREAM_ERROR",
            ApiError::Timeout => "TIMEOUT",
            ApiError::Internal(_) => "INTERNAL_ERROR",
            ApiError::Io(_) => "IO_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let request_id = uuid::Uuid::new_v4().to_string();

        if status.is_server_error() {
            tracing::error!(
                request_id = %request_id,
                error_code = %self.code(),
                error_message = %self,
                "API error occurred"
            );
        } else {
            tracing::warn!(
                request_id = %request_id,
                error_code = %self.code(),
                error_message = %self,
                "Request rejected"
            );
        }

        let mut response = (status, Json(MessageResponse::new(self.to_string()))).into_response();
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert("x-request-id", value);
        }
        response
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_validation_maps_to_bad_request() {
        let err: ApiError = StoreError::Validation("Device validation failed".into()).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Device validation failed");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(StoreError::Lock("poisoned".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(ReadingsError::InvalidLocator).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(ReadingsError::Status(500)).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(ApiError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Timeout.status(), StatusCode::REQUEST_TIMEOUT);
    }

    #[test]
    fn test_disallowed_source_is_a_client_error() {
        let err = ApiError::from(ReadingsError::DisallowedSource("127.0.0.1".into()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Readings source host is not allowed: 127.0.0.1");

        let oversized = ApiError::from(ReadingsError::TooLarge(1024));
        assert_eq!(oversized.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_response_carries_request_id() {
        let response = ApiError::NotFound("User not found".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().contains_key("x-request-id"));
    }
}

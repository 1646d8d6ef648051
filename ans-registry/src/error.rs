//! HTTP error type.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use ans_directory::{DirectoryError, ErrorClass};

/// Message returned for every unknown agent.
pub const AGENT_NOT_FOUND: &str = "Agent not found";

/// Errors returned by the registry's handlers.
///
/// Every variant renders as `{"error": message}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request was malformed or rejected by the directory.
    #[error("{0}")]
    BadRequest(String),
    /// The caller is not authenticated.
    #[error("{0}")]
    Unauthorized(String),
    /// The named agent does not exist.
    #[error("{0}")]
    NotFound(String),
    /// Anything else.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Returns the HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The error for an unknown agent.
    #[must_use]
    pub fn agent_not_found() -> Self {
        Self::NotFound(AGENT_NOT_FOUND.to_string())
    }
}

impl From<DirectoryError> for ApiError {
    fn from(error: DirectoryError) -> Self {
        match error.status_class() {
            ErrorClass::InvalidRequest => Self::BadRequest(error.to_string()),
            ErrorClass::NotFound => Self::agent_not_found(),
            ErrorClass::Internal => {
                tracing::error!(error = %error, "directory failure");
                Self::Internal(error.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.to_string() });
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_errors_map_to_status() {
        let cases = [
            (
                DirectoryError::InvalidName {
                    ans_name: "x".to_string(),
                    reason: "bad".to_string(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                DirectoryError::UntrustedCertificate {
                    ans_name: "x".to_string(),
                    reason: "bad".to_string(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (DirectoryError::CapacityExceeded { max: 1 }, StatusCode::BAD_REQUEST),
            (DirectoryError::not_found("x"), StatusCode::NOT_FOUND),
            (
                DirectoryError::internal("poisoned"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(ApiError::from(error).status(), status);
        }
    }

    #[test]
    fn not_found_uses_fixed_message() {
        let error = ApiError::from(DirectoryError::not_found("a2a://x.y.z.v1"));
        assert_eq!(error.to_string(), AGENT_NOT_FOUND);
    }

    #[test]
    fn response_has_error_body() {
        let response = ApiError::Unauthorized("Invalid token".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

//! Error types for the gateway
//!
//! The cache and the admission controller are total at call time; the only
//! errors they raise come from invalid configuration at construction. The
//! remaining variants belong to the HTTP surface.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Gateway Error Enum ==
/// Unified error type for the gateway.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration rejected at construction time
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Key absent or expired
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Admission controller rejected the caller
    #[error("Too Many Requests")]
    RateLimited,
}

// == IntoResponse Implementation ==
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::InvalidConfig(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the gateway.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_maps_to_429() {
        let response = Error::RateLimited.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let response = Error::NotFound("k".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(Error::RateLimited.to_string(), "Too Many Requests");
        assert_eq!(
            Error::InvalidConfig("capacity must be positive".to_string()).to_string(),
            "Invalid configuration: capacity must be positive"
        );
    }
}

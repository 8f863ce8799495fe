//! Remote store seam
//!
//! The update pipeline only ever talks to the remote resource manager through
//! [`GatewayStore`]. [`crate::arm::ArmClient`] is the HTTP implementation; tests
//! substitute an in-memory one.

use crate::gateway::{Gateway, Tags};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors reported by a remote store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Precondition failed: {message}")]
    PreconditionFailed { message: String },

    #[error("Rate limited: {message}")]
    RateLimited { message: String },

    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    #[error("Unexpected response ({status}): {message}")]
    Unexpected { status: u16, message: String },

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Long-running operation {status}: {message}")]
    OperationFailed { status: String, message: String },

    #[error("Long-running operation timed out after {0:?}")]
    OperationTimeout(Duration),
}

impl ApiError {
    /// Classify an HTTP error status
    #[must_use]
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            400 => ApiError::BadRequest { message },
            401 => ApiError::AuthenticationFailed { message },
            403 => ApiError::Forbidden { message },
            404 => ApiError::NotFound { message },
            409 => ApiError::Conflict { message },
            412 => ApiError::PreconditionFailed { message },
            429 => ApiError::RateLimited { message },
            500..=599 => ApiError::ServerError { status, message },
            _ => ApiError::Unexpected { status, message },
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            ApiError::AuthenticationFailed { .. } | ApiError::Forbidden { .. }
        )
    }

    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            ApiError::Conflict { .. } | ApiError::PreconditionFailed { .. }
        )
    }

    #[must_use]
    pub fn is_bad_request(&self) -> bool {
        matches!(self, ApiError::BadRequest { .. })
    }

    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, ApiError::ServerError { .. })
    }

    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ApiError::RateLimited { .. })
    }

    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::OperationTimeout(_))
    }

    /// Whether a caller could reasonably retry. Nothing in this crate does.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApiError::ServerError { .. }
                | ApiError::RateLimited { .. }
                | ApiError::ConnectionError(_)
                | ApiError::OperationTimeout(_)
        )
    }
}

/// Fetch and persist gateways in a remote store
#[async_trait]
pub trait GatewayStore: Send + Sync {
    /// Fetch the current gateway, or `None` when it does not exist
    async fn fetch_gateway(
        &self,
        resource_group_name: &str,
        name: &str,
    ) -> Result<Option<Gateway>, ApiError>;

    /// Create or update the gateway and return the server's view of it.
    ///
    /// `tags`, when present, replace the gateway's tags; otherwise the tags
    /// already on `gateway` are sent.
    async fn create_or_update_gateway(
        &self,
        resource_group_name: &str,
        name: &str,
        gateway: &Gateway,
        tags: Option<&Tags>,
    ) -> Result<Gateway, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_classification() {
        assert!(ApiError::from_status(404, "gone").is_not_found());
        assert!(ApiError::from_status(401, "no").is_unauthorized());
        assert!(ApiError::from_status(403, "no").is_unauthorized());
        assert!(ApiError::from_status(409, "busy").is_conflict());
        assert!(ApiError::from_status(412, "etag").is_conflict());
        assert!(ApiError::from_status(400, "bad").is_bad_request());
        assert!(ApiError::from_status(429, "slow down").is_rate_limited());
        assert!(ApiError::from_status(503, "down").is_server_error());
        assert!(matches!(
            ApiError::from_status(418, "teapot"),
            ApiError::Unexpected { status: 418, .. }
        ));
    }

    #[test]
    fn test_retryable() {
        assert!(ApiError::from_status(500, "boom").is_retryable());
        assert!(ApiError::from_status(429, "slow").is_retryable());
        assert!(ApiError::ConnectionError("refused".to_string()).is_retryable());
        assert!(ApiError::OperationTimeout(Duration::from_secs(1)).is_retryable());
        assert!(!ApiError::from_status(400, "bad").is_retryable());
        assert!(!ApiError::from_status(404, "gone").is_retryable());
    }

    #[test]
    fn test_display_includes_status() {
        let err = ApiError::from_status(502, "bad gateway");
        assert_eq!(err.to_string(), "Server error (502): bad gateway");
    }
}

//! Unified error handling for gatewayctl-core
//!
//! Local failures (bad identity, missing gateway, bad bounds) are their own
//! variants; anything the remote store reports is wrapped unchanged in
//! [`CoreError::RemoteOperationFailed`].
//!
//! # Example
//!
//! ```rust
//! use gatewayctl_core::{ApiError, CoreError};
//!
//! let err: CoreError = ApiError::from_status(404, "gateway not found").into();
//! assert!(err.is_not_found());
//! assert!(!err.is_retryable());
//! ```

use crate::config::ConfigError;
use crate::resource_id::ParseResourceIdError;
use crate::store::ApiError;
use thiserror::Error;

/// Core error type for the gateway update pipeline
#[derive(Error, Debug)]
pub enum CoreError {
    /// Resource id could not be parsed
    #[error("Malformed resource identifier: {0}")]
    MalformedIdentifier(#[from] ParseResourceIdError),

    /// No gateway exists at the resolved identity
    #[error("Express route gateway '{name}' not found in resource group '{resource_group_name}'")]
    NotFound {
        resource_group_name: String,
        name: String,
    },

    /// Requested minimum is above the requested maximum
    #[error("Invalid auto-scale configuration: min bounds ({min}) cannot be greater than max bounds ({max})")]
    InvalidBounds { min: u32, max: u32 },

    /// Requested bound does not fit the gateway's signed field
    #[error("{field} bounds value {value} exceeds the maximum of {limit}", limit = i32::MAX)]
    BoundsOutOfRange { field: &'static str, value: u32 },

    /// Error from the remote store, propagated verbatim
    #[error("Remote operation failed: {0}")]
    RemoteOperationFailed(#[from] ApiError),

    /// Background job ended without producing a result
    #[error("Background job failed: {0}")]
    JobFailed(String),

    /// Validation error on caller input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Returns true if the gateway does not exist, locally or per the remote
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            CoreError::NotFound { .. } => true,
            CoreError::RemoteOperationFailed(e) => e.is_not_found(),
            _ => false,
        }
    }

    /// Returns true if this is an authentication/authorization error (401/403)
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        match self {
            CoreError::RemoteOperationFailed(e) => e.is_unauthorized(),
            _ => false,
        }
    }

    /// Returns true if this is a conflict/precondition error (409/412)
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        match self {
            CoreError::RemoteOperationFailed(e) => e.is_conflict(),
            _ => false,
        }
    }

    /// Returns true for errors caused by the caller's input
    #[must_use]
    pub fn is_bad_request(&self) -> bool {
        match self {
            CoreError::MalformedIdentifier(_)
            | CoreError::InvalidBounds { .. }
            | CoreError::BoundsOutOfRange { .. }
            | CoreError::Validation(_) => true,
            CoreError::RemoteOperationFailed(e) => e.is_bad_request(),
            _ => false,
        }
    }

    /// Returns true if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        match self {
            CoreError::RemoteOperationFailed(e) => e.is_server_error(),
            _ => false,
        }
    }

    /// Returns true if this is a timeout error
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            CoreError::RemoteOperationFailed(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Returns true if this error is potentially retryable.
    /// Local validation failures never are.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            CoreError::RemoteOperationFailed(e) => e.is_retryable(),
            _ => false,
        }
    }
}

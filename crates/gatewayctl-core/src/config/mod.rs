//! Configuration and profile management
//!
//! Profiles name a subscription and the endpoint and token used to reach it.
//!
//! # Features
//!
//! - Multiple named profiles
//! - Environment variable expansion in config files
//! - Platform-specific config file locations
//! - Environment overrides for subscription, endpoint and token

#[allow(clippy::module_inception)]
pub mod config;
pub mod error;

// Re-export main types for convenience
pub use config::{
    Config, DEFAULT_API_URL, DEFAULT_API_VERSION, DEFAULT_OPERATION_TIMEOUT_SECS,
    DEFAULT_POLL_INTERVAL_SECS, Profile,
};
pub use error::{ConfigError, Result};

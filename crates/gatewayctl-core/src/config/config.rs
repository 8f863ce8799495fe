//! Configuration management for gatewayctl
//!
//! Handles configuration loading from files and environment variables.
//! Configuration is stored in TOML format with support for multiple named profiles.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::error::{ConfigError, Result};
use crate::arm::ArmClientConfig;

/// Default resource manager endpoint
pub const DEFAULT_API_URL: &str = "https://management.azure.com";
/// API version used for express route gateway calls
pub const DEFAULT_API_VERSION: &str = "2018-08-01";
/// How long to wait for a long-running update
pub const DEFAULT_OPERATION_TIMEOUT_SECS: u64 = 1800;
/// Delay between long-running operation polls
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

/// Main configuration structure
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Config {
    /// Profile used when none is given on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,
    /// Map of profile name -> profile configuration
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

/// Individual profile configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Profile {
    /// Subscription holding the gateways
    pub subscription_id: String,
    /// Resource manager endpoint
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Bearer token sent with every request. Usually `${SOME_ENV_VAR}`.
    ///
    /// References are kept as written and expanded only in
    /// [`Profile::client_config`], so saving never writes a resolved secret.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Give up on a long-running update after this many seconds
    #[serde(default = "default_operation_timeout")]
    pub operation_timeout_secs: u64,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_operation_timeout() -> u64 {
    DEFAULT_OPERATION_TIMEOUT_SECS
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

impl Profile {
    /// Create a profile for `subscription_id` with default settings
    pub fn new(subscription_id: impl Into<String>) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            api_url: default_api_url(),
            access_token: None,
            api_version: default_api_version(),
            operation_timeout_secs: DEFAULT_OPERATION_TIMEOUT_SECS,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }

    /// Client settings for this profile, with `${VAR}` references expanded
    pub fn client_config(&self) -> ArmClientConfig {
        ArmClientConfig {
            api_url: expand_env_vars(&self.api_url),
            subscription_id: expand_env_vars(&self.subscription_id),
            access_token: self.access_token.as_deref().map(expand_env_vars),
            api_version: expand_env_vars(&self.api_version),
            operation_timeout: Duration::from_secs(self.operation_timeout_secs),
            poll_interval: Duration::from_secs(self.poll_interval_secs),
        }
    }

    /// Check that required fields survive env expansion
    pub fn validate(&self, name: &str) -> Result<()> {
        let subscription_id = expand_env_vars(&self.subscription_id);
        if subscription_id.trim().is_empty() || subscription_id.starts_with("${") {
            return Err(ConfigError::MissingField {
                profile: name.to_string(),
                field: "subscription_id".to_string(),
            });
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from the standard location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(config_path).map_err(|e| ConfigError::LoadError {
            path: config_path.display().to_string(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content)?;

        Ok(config)
    }

    /// Save configuration to the standard location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to_path(&config_path)
    }

    /// Save configuration to a specific path
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        // Create parent directories if they don't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::SaveError {
                path: parent.display().to_string(),
                source: e,
            })?;
        }

        let content = toml::to_string_pretty(self)?;

        fs::write(config_path, content).map_err(|e| ConfigError::SaveError {
            path: config_path.display().to_string(),
            source: e,
        })?;

        Ok(())
    }

    /// Insert or replace a profile
    pub fn set_profile(&mut self, name: String, profile: Profile) {
        self.profiles.insert(name, profile);
    }

    /// Remove a profile, clearing the default if it pointed at it
    pub fn remove_profile(&mut self, name: &str) -> Option<Profile> {
        if self.default_profile.as_deref() == Some(name) {
            self.default_profile = None;
        }
        self.profiles.remove(name)
    }

    /// All profiles sorted by name
    pub fn list_profiles(&self) -> Vec<(&String, &Profile)> {
        let mut profiles: Vec<_> = self.profiles.iter().collect();
        profiles.sort_by_key(|(name, _)| *name);
        profiles
    }

    /// Look up a profile by name
    pub fn profile(&self, name: &str) -> Result<&Profile> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound {
                name: name.to_string(),
            })
    }

    /// Resolve the profile name to use
    ///
    /// Order: explicit name, `default_profile`, first profile alphabetically.
    pub fn resolve_profile(&self, explicit_profile: Option<&str>) -> Result<String> {
        if let Some(profile_name) = explicit_profile {
            return Ok(profile_name.to_string());
        }

        if let Some(ref default) = self.default_profile {
            return Ok(default.clone());
        }

        self.list_profiles()
            .first()
            .map(|(name, _)| (*name).clone())
            .ok_or_else(|| ConfigError::NoProfiles {
                suggestion: "Use 'gatewayctl profile set' to create a profile.".to_string(),
            })
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "gatewayctl", "gatewayctl")
            .ok_or(ConfigError::ConfigDirError)?;

        Ok(proj_dirs.config_dir().join("config.toml"))
    }
}

/// Expand `${VAR}` references, leaving unknown variables as written
fn expand_env_vars(value: &str) -> String {
    // Unset vars are reported by `validate`, not here
    shellexpand::env_with_context_no_errors(value, |var| std::env::var(var).ok()).into_owned()
}

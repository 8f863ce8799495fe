//! Connection management for the resource manager client

use crate::error::Result as CliResult;
use gatewayctl_core::{ArmClient, ArmClientConfig, Config, ProgressCallback};
use std::path::PathBuf;
use tracing::{debug, info, trace};

const ENV_SUBSCRIPTION_ID: &str = "GATEWAYCTL_SUBSCRIPTION_ID";
const ENV_ACCESS_TOKEN: &str = "GATEWAYCTL_ACCESS_TOKEN";
const ENV_API_URL: &str = "GATEWAYCTL_API_URL";

/// Connection manager for creating authenticated clients
#[derive(Clone)]
pub struct ConnectionManager {
    pub config: Config,
    pub config_path: Option<PathBuf>,
}

/// Environment overrides, read once
#[derive(Debug, Default, Clone)]
struct EnvOverrides {
    subscription_id: Option<String>,
    access_token: Option<String>,
    api_url: Option<String>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        let read = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            subscription_id: read(ENV_SUBSCRIPTION_ID),
            access_token: read(ENV_ACCESS_TOKEN),
            api_url: read(ENV_API_URL),
        }
    }

    fn is_empty(&self) -> bool {
        self.subscription_id.is_none() && self.access_token.is_none() && self.api_url.is_none()
    }

    fn apply(self, mut config: ArmClientConfig) -> ArmClientConfig {
        if let Some(subscription_id) = self.subscription_id {
            config.subscription_id = subscription_id;
        }
        if let Some(token) = self.access_token {
            config.access_token = Some(token);
        }
        if let Some(api_url) = self.api_url {
            config.api_url = api_url;
        }
        config
    }
}

impl ConnectionManager {
    /// Create a new connection manager with a custom config path
    pub fn with_config_path(config: Config, config_path: Option<PathBuf>) -> Self {
        Self {
            config,
            config_path,
        }
    }

    /// Save the configuration to the appropriate location
    pub fn save_config(&self) -> CliResult<()> {
        match &self.config_path {
            Some(path) => self.config.save_to_path(path)?,
            None => self.config.save()?,
        }
        Ok(())
    }

    /// Where the configuration lives, for display
    pub fn config_location(&self) -> Option<PathBuf> {
        self.config_path
            .clone()
            .or_else(|| Config::config_path().ok())
    }

    /// Resolve client settings from the profile and environment
    ///
    /// When --config-file is explicitly specified, environment variables are ignored so an
    /// isolated config behaves the same everywhere. Without profiles,
    /// `GATEWAYCTL_SUBSCRIPTION_ID` alone is enough to build a client.
    pub fn client_config(&self, profile_name: Option<&str>) -> CliResult<ArmClientConfig> {
        let use_env_vars = self.config_path.is_none();
        debug!(
            "Config path: {:?}, use_env_vars: {}",
            self.config_path, use_env_vars
        );

        let env = if use_env_vars {
            EnvOverrides::from_env()
        } else {
            info!("--config-file specified explicitly, ignoring environment variables");
            EnvOverrides::default()
        };
        trace!(
            subscription = env.subscription_id.is_some(),
            token = env.access_token.is_some(),
            api_url = env.api_url.is_some(),
            "Environment overrides present"
        );

        if profile_name.is_none()
            && self.config.profiles.is_empty()
            && let Some(subscription_id) = env.subscription_id.clone()
        {
            info!("Using subscription from {}", ENV_SUBSCRIPTION_ID);
            return Ok(env.apply(ArmClientConfig::new(subscription_id)));
        }

        let resolved_profile_name = self.config.resolve_profile(profile_name)?;
        info!("Using profile: {}", resolved_profile_name);

        let profile = self.config.profile(&resolved_profile_name)?;
        let has_overrides = !env.is_empty();
        let client_config = env.apply(profile.client_config());

        if has_overrides {
            info!("Applied environment overrides to profile '{}'", resolved_profile_name);
        } else {
            profile.validate(&resolved_profile_name)?;
        }

        Ok(client_config)
    }

    /// Create an ARM client, optionally reporting long-running operation progress
    pub fn create_arm_client(
        &self,
        profile_name: Option<&str>,
        on_progress: Option<ProgressCallback>,
    ) -> CliResult<ArmClient> {
        debug!("Creating ARM client");
        let client_config = self.client_config(profile_name)?;
        let client = ArmClient::new(client_config)?;

        Ok(match on_progress {
            Some(callback) => client.with_progress(callback),
            None => client,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatewayctl_core::Profile;

    fn isolated(config: Config) -> ConnectionManager {
        ConnectionManager::with_config_path(config, Some(PathBuf::from("/nonexistent/config.toml")))
    }

    #[test]
    fn test_client_config_from_profile() {
        let mut config = Config::default();
        let mut profile = Profile::new("sub-1");
        profile.access_token = Some("tok".to_string());
        config.set_profile("prod".to_string(), profile);

        let client_config = isolated(config).client_config(None).unwrap();
        assert_eq!(client_config.subscription_id, "sub-1");
        assert_eq!(client_config.access_token.as_deref(), Some("tok"));
    }

    #[test]
    fn test_explicit_profile_must_exist() {
        let mut config = Config::default();
        config.set_profile("prod".to_string(), Profile::new("sub-1"));

        let err = isolated(config).client_config(Some("staging")).unwrap_err();
        assert!(matches!(err, crate::error::CliError::ProfileNotFound { .. }));
    }

    #[test]
    fn test_no_profiles_with_isolated_config() {
        let err = isolated(Config::default()).client_config(None).unwrap_err();
        assert!(matches!(err, crate::error::CliError::NoProfileConfigured));
    }

    #[test]
    fn test_unexpanded_subscription_is_rejected() {
        let mut config = Config::default();
        config.set_profile("prod".to_string(), Profile::new("${NOT_SET_ANYWHERE}"));

        let err = isolated(config).client_config(None).unwrap_err();
        assert!(matches!(err, crate::error::CliError::MissingField { .. }));
    }

    #[test]
    fn test_env_overrides_apply_over_profile() {
        let overrides = EnvOverrides {
            subscription_id: None,
            access_token: Some("env-token".to_string()),
            api_url: Some("http://localhost:1".to_string()),
        };
        let config = overrides.apply(Profile::new("sub-1").client_config());
        assert_eq!(config.subscription_id, "sub-1");
        assert_eq!(config.access_token.as_deref(), Some("env-token"));
        assert_eq!(config.api_url, "http://localhost:1");
    }
}

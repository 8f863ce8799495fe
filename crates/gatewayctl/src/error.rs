//! Error types for gatewayctl

use colored::Colorize;
use gatewayctl_core::{ApiError, ConfigError, CoreError};
use thiserror::Error;

/// Cargo-style diagnostic formatter for CLI errors.
///
/// Produces structured output like:
/// ```text
/// error: Invalid auto-scale configuration: min bounds (10) cannot be greater than max bounds (2)
///
///   tip: --min-bounds must be less than or equal to --max-bounds
/// ```
pub struct CliDiagnostic {
    message: String,
    tips: Vec<(String, Vec<String>)>,
}

impl CliDiagnostic {
    /// Start a new error diagnostic with the given message.
    pub fn error(message: &str) -> Self {
        Self {
            message: message.to_string(),
            tips: Vec::new(),
        }
    }

    /// Add a tip with optional example commands.
    pub fn tip(mut self, description: &str, commands: &[&str]) -> Self {
        self.tips.push((
            description.to_string(),
            commands.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }

    /// Print the diagnostic to stderr with colored formatting.
    pub fn print(&self) {
        eprint!("{}{}", "error".red().bold(), ": ".bold());
        eprintln!("{}", self.message);

        for (description, commands) in &self.tips {
            eprintln!();
            eprint!("  {}{}", "tip".yellow().bold(), ": ".bold());
            eprintln!("{}", description);
            for cmd in commands {
                eprintln!("      {}", cmd);
            }
        }
    }
}

/// Main error type for the gatewayctl application
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("No profile configured. Use 'gatewayctl profile set' to configure a profile.")]
    NoProfileConfigured,

    #[error("Profile '{profile}' is missing '{field}'")]
    MissingField { profile: String, field: String },

    #[error("Invalid resource id: {message}")]
    InvalidResourceId { message: String },

    #[error("{message}")]
    GatewayNotFound { message: String },

    #[error("{message}")]
    InvalidBounds { message: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("API error: {message}")]
    ApiError { message: String },

    #[error("Connection error: {message}")]
    ConnectionError { message: String },

    #[error("Timeout: {message}")]
    Timeout { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("File error for '{path}': {message}")]
    FileError { path: String, message: String },

    #[error("Output formatting error: {message}")]
    OutputError { message: String },
}

/// Result type for gatewayctl operations
pub type Result<T> = std::result::Result<T, CliError>;

impl CliError {
    /// Get helpful suggestions for resolving this error
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            CliError::ProfileNotFound { name } => vec![
                "List available profiles: gatewayctl profile list".to_string(),
                format!(
                    "Create profile '{}': gatewayctl profile set {} --subscription-id <id>",
                    name, name
                ),
            ],
            CliError::NoProfileConfigured => vec![
                "Create a profile: gatewayctl profile set <name> --subscription-id <id> --access-token <token>".to_string(),
                "Or set GATEWAYCTL_SUBSCRIPTION_ID and GATEWAYCTL_ACCESS_TOKEN".to_string(),
            ],
            CliError::MissingField { profile, field } => vec![
                format!("Check profile details: gatewayctl profile show {}", profile),
                format!(
                    "If '{}' references an environment variable, make sure it is set",
                    field
                ),
            ],
            CliError::InvalidResourceId { .. } => vec![
                "Expected /subscriptions/<sub>/resourceGroups/<rg>/providers/Microsoft.Network/expressRouteGateways/<name>".to_string(),
            ],
            CliError::GatewayNotFound { .. } => vec![
                "Check the resource group and gateway name".to_string(),
                "Check that you're using the correct profile and subscription".to_string(),
            ],
            CliError::InvalidBounds { .. } => vec![
                "--min-bounds must be less than or equal to --max-bounds".to_string(),
            ],
            CliError::AuthenticationFailed { .. } => vec![
                "Check the access token: gatewayctl profile show <profile>".to_string(),
                "Tokens expire; fetch a fresh one and update the profile or GATEWAYCTL_ACCESS_TOKEN".to_string(),
            ],
            CliError::ConnectionError { .. } => vec![
                "Check network connectivity".to_string(),
                "Verify the API URL is correct: gatewayctl profile show <profile>".to_string(),
            ],
            CliError::Timeout { .. } => vec![
                "The update may still complete; check with: gatewayctl gateway get".to_string(),
                "Raise the limit: gatewayctl profile set <name> --operation-timeout <secs>".to_string(),
            ],
            CliError::InvalidInput { .. } => vec![
                "Check the command syntax: gatewayctl <command> --help".to_string(),
                "Verify input JSON matches the output of 'gatewayctl gateway get -o json'".to_string(),
            ],
            CliError::FileError { path, .. } => vec![
                format!("Check that file exists: {}", path),
                "Verify file permissions are correct".to_string(),
            ],
            _ => vec![],
        }
    }

    /// Print a cargo-style diagnostic to stderr using colored formatting.
    pub fn print_diagnostic(&self) {
        let mut diag = CliDiagnostic::error(&format!("{}", self));

        for suggestion in self.suggestions() {
            diag = diag.tip(&suggestion, &[]);
        }

        diag.print();
    }
}

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::AuthenticationFailed { message } | ApiError::Forbidden { message } => {
                CliError::AuthenticationFailed { message }
            }
            ApiError::ConnectionError(message) => CliError::ConnectionError { message },
            ApiError::OperationTimeout(duration) => CliError::Timeout {
                message: format!("Operation timed out after {} seconds", duration.as_secs()),
            },
            ApiError::NotFound { message } => CliError::GatewayNotFound { message },
            _ => CliError::ApiError {
                message: err.to_string(),
            },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::ProfileNotFound { name } => CliError::ProfileNotFound { name },
            ConfigError::NoProfiles { .. } => CliError::NoProfileConfigured,
            ConfigError::MissingField { profile, field } => {
                CliError::MissingField { profile, field }
            }
            _ => CliError::Configuration(err.to_string()),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::MalformedIdentifier(e) => CliError::InvalidResourceId {
                message: e.to_string(),
            },
            CoreError::NotFound { .. } => CliError::GatewayNotFound {
                message: err.to_string(),
            },
            CoreError::InvalidBounds { .. } | CoreError::BoundsOutOfRange { .. } => {
                CliError::InvalidBounds {
                    message: err.to_string(),
                }
            }
            CoreError::RemoteOperationFailed(api_err) => CliError::from(api_err),
            CoreError::JobFailed(message) => CliError::ApiError {
                message: format!("Background job failed: {}", message),
            },
            CoreError::Validation(message) => CliError::InvalidInput { message },
            CoreError::Config(config_err) => CliError::from(config_err),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::OutputError {
            message: format!("JSON error: {}", err),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::OutputError {
            message: format!("IO error: {}", err),
        }
    }
}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::OutputError {
            message: format!("{:#}", err),
        }
    }
}

//! Shared helpers for command handlers

use std::fs;
use std::io::{self, Read, Write};

use gatewayctl_core::{ConfirmationGate, CoreError};

use crate::error::{CliError, Result as CliResult};

/// Ask the user to confirm an action on stdin
pub fn confirm_action(message: &str) -> CliResult<bool> {
    // Prompt on stderr so stdout stays machine-readable
    eprint!("Are you sure you want to {}? [y/N]: ", message);
    io::stderr().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().eq_ignore_ascii_case("y") || input.trim().eq_ignore_ascii_case("yes"))
}

/// Confirmation gate backed by an interactive prompt
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptConfirmation;

impl ConfirmationGate for PromptConfirmation {
    fn should_proceed(&self, description: &str) -> gatewayctl_core::Result<bool> {
        confirm_action(description)
            .map_err(|e| CoreError::Validation(format!("could not read confirmation: {e}")))
    }
}

/// Read input supporting `@filename`, `-` for stdin, or the literal value
pub fn read_file_input(input: &str) -> CliResult<String> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| CliError::FileError {
                path: "<stdin>".to_string(),
                message: e.to_string(),
            })?;
        Ok(buffer)
    } else if let Some(filename) = input.strip_prefix('@') {
        fs::read_to_string(filename).map_err(|e| CliError::FileError {
            path: filename.to_string(),
            message: e.to_string(),
        })
    } else {
        Ok(input.to_string())
    }
}

/// Parse JSON input, naming what was being read on failure
pub fn parse_json_input<T: serde::de::DeserializeOwned>(what: &str, input: &str) -> CliResult<T> {
    let content = read_file_input(input)?;
    serde_json::from_str(&content).map_err(|e| CliError::InvalidInput {
        message: format!("{what} is not valid JSON: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatewayctl_core::Connection;

    #[test]
    fn test_read_file_input_literal() {
        assert_eq!(read_file_input("[]").unwrap(), "[]");
    }

    #[test]
    fn test_read_file_input_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("connections.json");
        fs::write(&path, r#"[{"name": "c1"}]"#).unwrap();

        let content = read_file_input(&format!("@{}", path.display())).unwrap();
        assert!(content.contains("c1"));
    }

    #[test]
    fn test_read_file_input_missing_file() {
        let err = read_file_input("@/nonexistent/gatewayctl/input.json").unwrap_err();
        assert!(matches!(err, CliError::FileError { ref path, .. } if path == "/nonexistent/gatewayctl/input.json"));
    }

    #[test]
    fn test_parse_json_input() {
        let connections: Vec<Connection> =
            parse_json_input("--connections", r#"[{"name": "c1", "routingWeight": 5}]"#).unwrap();
        assert_eq!(connections.len(), 1);
        assert_eq!(connections[0].routing_weight, Some(5));

        let err = parse_json_input::<Vec<Connection>>("--connections", "{not json").unwrap_err();
        assert!(err.to_string().contains("--connections is not valid JSON"));
    }
}

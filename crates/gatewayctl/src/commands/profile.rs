//! Profile management commands

use colored::Colorize;
use gatewayctl_core::Profile;
use tracing::{debug, info, trace};

use crate::cli::{OutputFormat, ProfileCommands};
use crate::connection::ConnectionManager;
use crate::error::{CliError, Result as CliResult};
use crate::output::{self, print_output};

pub async fn handle_profile_command(
    profile_cmd: &ProfileCommands,
    conn_mgr: &mut ConnectionManager,
    output_format: OutputFormat,
) -> CliResult<()> {
    use ProfileCommands::*;

    match profile_cmd {
        List => handle_list(conn_mgr, output_format),
        Path => handle_path(conn_mgr, output_format),
        Show { name } => handle_show(conn_mgr, name, output_format),
        Set {
            name,
            subscription_id,
            api_url,
            access_token,
            api_version,
            operation_timeout,
            poll_interval,
            default,
        } => {
            let mut profile = Profile::new(subscription_id);
            if let Some(api_url) = api_url {
                profile.api_url = api_url.clone();
            }
            profile.access_token = access_token.clone();
            if let Some(api_version) = api_version {
                profile.api_version = api_version.clone();
            }
            if let Some(secs) = operation_timeout {
                profile.operation_timeout_secs = *secs;
            }
            if let Some(secs) = poll_interval {
                profile.poll_interval_secs = *secs;
            }
            handle_set(conn_mgr, name, profile, *default)
        }
        Remove { name } => handle_remove(conn_mgr, name),
        Default { name } => handle_default(conn_mgr, name),
    }
}

/// Profile as shown to users: the token is never printed
fn profile_summary(name: &str, profile: &Profile, is_default: bool) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "subscription_id": profile.subscription_id,
        "api_url": profile.api_url,
        "api_version": profile.api_version,
        "access_token": profile.access_token.as_ref().map(|_| "********"),
        "operation_timeout_secs": profile.operation_timeout_secs,
        "poll_interval_secs": profile.poll_interval_secs,
        "is_default": is_default,
    })
}

fn handle_list(conn_mgr: &ConnectionManager, output_format: OutputFormat) -> CliResult<()> {
    debug!("Listing all configured profiles");
    let profiles = conn_mgr.config.list_profiles();
    trace!("Found {} profiles", profiles.len());
    let default = conn_mgr.config.default_profile.as_deref();

    match output_format {
        OutputFormat::Json | OutputFormat::Yaml => {
            let profile_list: Vec<_> = profiles
                .iter()
                .map(|(name, profile)| {
                    profile_summary(name, profile, default == Some(name.as_str()))
                })
                .collect();

            let output_data = serde_json::json!({
                "config_path": conn_mgr.config_location().map(|p| p.display().to_string()),
                "profiles": profile_list,
                "count": profiles.len(),
            });
            print_output(&output_data, output_format.into())?;
        }
        OutputFormat::Table => {
            let rows: Vec<_> = profiles
                .iter()
                .map(|(name, profile)| {
                    serde_json::json!({
                        "name": name,
                        "subscription_id": profile.subscription_id,
                        "api_url": profile.api_url,
                        "default": default == Some(name.as_str()),
                    })
                })
                .collect();
            if rows.is_empty() {
                println!("No profiles configured.");
            } else {
                print_output(&rows, output::OutputFormat::Table)?;
            }
        }
        OutputFormat::Auto => {
            if let Some(path) = conn_mgr.config_location() {
                println!("Configuration file: {}", path.display());
                println!();
            }

            if profiles.is_empty() {
                info!("No profiles configured");
                println!("No profiles configured.");
                println!("Use 'gatewayctl profile set' to create a profile.");
                return Ok(());
            }

            for (name, profile) in &profiles {
                if default == Some(name.as_str()) {
                    println!("{} {}", name.bold().cyan(), "(default)".green());
                } else {
                    println!("{}", name.bold().cyan());
                }
                println!("  {} {}", "Subscription:".dimmed(), profile.subscription_id);
                println!("  {}          {}", "URL:".dimmed(), profile.api_url);
            }
        }
    }

    Ok(())
}

fn handle_path(conn_mgr: &ConnectionManager, output_format: OutputFormat) -> CliResult<()> {
    let path = conn_mgr
        .config_location()
        .ok_or_else(|| CliError::Configuration("Failed to determine config directory".to_string()))?;

    match output_format {
        OutputFormat::Json | OutputFormat::Yaml => {
            let data = serde_json::json!({ "config_path": path.display().to_string() });
            print_output(&data, output_format.into())?;
        }
        _ => println!("{}", path.display()),
    }
    Ok(())
}

fn handle_show(
    conn_mgr: &ConnectionManager,
    name: &str,
    output_format: OutputFormat,
) -> CliResult<()> {
    debug!("Showing profile '{}'", name);
    let profile = conn_mgr.config.profile(name)?;
    let is_default = conn_mgr.config.default_profile.as_deref() == Some(name);

    print_output(
        profile_summary(name, profile, is_default),
        output_format.into(),
    )?;
    Ok(())
}

fn handle_set(
    conn_mgr: &mut ConnectionManager,
    name: &str,
    profile: Profile,
    make_default: bool,
) -> CliResult<()> {
    debug!("Setting profile '{}'", name);
    let existed = conn_mgr.config.profiles.contains_key(name);

    conn_mgr.config.set_profile(name.to_string(), profile);
    if make_default || conn_mgr.config.profiles.len() == 1 {
        conn_mgr.config.default_profile = Some(name.to_string());
    }
    conn_mgr.save_config()?;

    info!("Saved profile '{}'", name);
    if existed {
        println!("Profile '{}' updated", name);
    } else {
        println!("Profile '{}' created", name);
    }
    if conn_mgr.config.default_profile.as_deref() == Some(name) {
        println!("Profile '{}' is the default", name);
    }
    Ok(())
}

fn handle_remove(conn_mgr: &mut ConnectionManager, name: &str) -> CliResult<()> {
    debug!("Removing profile '{}'", name);
    if conn_mgr.config.remove_profile(name).is_none() {
        return Err(CliError::ProfileNotFound {
            name: name.to_string(),
        });
    }
    conn_mgr.save_config()?;
    println!("Profile '{}' removed", name);
    Ok(())
}

fn handle_default(conn_mgr: &mut ConnectionManager, name: &str) -> CliResult<()> {
    // Fail early on unknown names
    conn_mgr.config.profile(name)?;
    conn_mgr.config.default_profile = Some(name.to_string());
    conn_mgr.save_config()?;
    println!("Default profile set to '{}'", name);
    Ok(())
}

use anyhow::Result;
use clap::Parser;
use gatewayctl_core::Config;
use tracing::{debug, error, info, trace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod connection;
mod error;
mod output;

use cli::{Cli, Commands};
use connection::ConnectionManager;
use error::CliError;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level
    init_tracing(cli.verbose);

    // Load configuration from specified path or default location
    let loaded = match &cli.config_file {
        Some(config_file) => {
            let path = std::path::PathBuf::from(config_file);
            debug!("Loading config from explicit path: {:?}", path);
            Config::load_from_path(&path).map(|config| (config, Some(path)))
        }
        None => {
            debug!("Loading config from default location");
            Config::load().map(|config| (config, None))
        }
    };
    let (config, config_path) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => {
            CliError::from(e).print_diagnostic();
            std::process::exit(1);
        }
    };
    let mut conn_mgr = ConnectionManager::with_config_path(config, config_path);

    // Execute command
    if let Err(e) = execute_command(&cli, &mut conn_mgr).await {
        e.print_diagnostic();
        std::process::exit(1);
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    // Check for RUST_LOG env var first, then fall back to verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "gatewayctl=warn,gatewayctl_core=warn",
            1 => "gatewayctl=info,gatewayctl_core=info",
            2 => "gatewayctl=debug,gatewayctl_core=debug",
            _ => "gatewayctl=trace,gatewayctl_core=trace",
        };
        tracing_subscriber::EnvFilter::new(level)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .compact(),
        )
        .init();

    debug!("Tracing initialized with verbosity level: {}", verbose);
}

async fn execute_command(cli: &Cli, conn_mgr: &mut ConnectionManager) -> Result<(), CliError> {
    trace!("Executing command: {:?}", cli.command);
    info!("Command: {}", format_command(&cli.command));

    let start = std::time::Instant::now();
    let result = match &cli.command {
        Commands::Version => {
            debug!("Showing version information");
            match cli.output {
                cli::OutputFormat::Json | cli::OutputFormat::Yaml => {
                    let output_data = serde_json::json!({
                        "version": env!("CARGO_PKG_VERSION"),
                        "name": env!("CARGO_PKG_NAME"),
                    });
                    output::print_output(&output_data, cli.output.into())?;
                }
                _ => {
                    println!("gatewayctl {}", env!("CARGO_PKG_VERSION"));
                }
            }
            Ok(())
        }

        Commands::Profile(profile_cmd) => {
            debug!("Executing profile command");
            commands::profile::handle_profile_command(profile_cmd, conn_mgr, cli.output).await
        }

        Commands::Gateway(gateway_cmd) => {
            debug!("Executing gateway command");
            commands::gateway::handle_gateway_command(
                gateway_cmd,
                conn_mgr,
                cli.profile.as_deref(),
                cli.output,
            )
            .await
        }
    };

    let duration = start.elapsed();
    match &result {
        Ok(_) => info!("Command completed successfully in {:?}", duration),
        Err(e) => error!("Command failed after {:?}: {}", duration, e),
    }

    result
}

/// Format command for human-readable logging (without sensitive data)
fn format_command(command: &Commands) -> String {
    match command {
        Commands::Version => "version".to_string(),
        Commands::Profile(cmd) => {
            use cli::ProfileCommands::*;
            match cmd {
                List => "profile list".to_string(),
                Path => "profile path".to_string(),
                Show { name } => format!("profile show {}", name),
                Set { name, .. } => format!("profile set {} [token redacted]", name),
                Remove { name } => format!("profile remove {}", name),
                Default { name } => format!("profile default {}", name),
            }
        }
        Commands::Gateway(cmd) => match cmd {
            cli::GatewayCommands::Set(args) => format!(
                "gateway set {} bounds={}..{}{}{}",
                describe_target(
                    args.resource_group.as_deref(),
                    args.name.as_deref(),
                    args.resource_id.as_deref(),
                    args.input_object.is_some()
                ),
                args.min_bounds,
                args.max_bounds,
                if args.force { " --force" } else { "" },
                if args.as_job { " --as-job" } else { "" },
            ),
            cli::GatewayCommands::Get(args) => format!(
                "gateway get {}",
                describe_target(
                    args.resource_group.as_deref(),
                    args.name.as_deref(),
                    args.resource_id.as_deref(),
                    false
                )
            ),
        },
    }
}

fn describe_target(
    resource_group: Option<&str>,
    name: Option<&str>,
    resource_id: Option<&str>,
    input_object: bool,
) -> String {
    match (resource_group, name, resource_id) {
        (Some(rg), Some(name), _) => format!("{}/{}", rg, name),
        (_, _, Some(id)) => id.to_string(),
        _ if input_object => "<input object>".to_string(),
        _ => "<unknown>".to_string(),
    }
}

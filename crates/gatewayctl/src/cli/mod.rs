//! CLI structure and command definitions

use clap::{ArgGroup, Args, Parser, Subcommand};

/// Express route gateway management CLI
#[derive(Parser, Debug)]
#[command(name = "gatewayctl")]
#[command(version, about = "Manage express route gateway autoscale bounds and connections")]
#[command(long_about = "
Manage express route gateway autoscale bounds and connections

EXAMPLES:
    # Set up a profile
    gatewayctl profile set prod --subscription-id 00000000-0000-0000-0000-000000000000 \\
        --access-token '${GATEWAYCTL_TOKEN}'

    # Show a gateway
    gatewayctl gateway get -g rg1 -n gw1

    # Scale a gateway and replace its connections
    gatewayctl gateway set -g rg1 -n gw1 --min-bounds 2 --max-bounds 10 \\
        --connections @connections.json

    # Pipe a gateway back in and update it without a prompt
    gatewayctl gateway get -g rg1 -n gw1 -o json > gw.json
    gatewayctl gateway set --input-object @gw.json --min-bounds 2 --max-bounds 4 --force

For more help on a specific command, run:
    gatewayctl <command> --help
")]
pub struct Cli {
    /// Profile to use for this command
    #[arg(long, short, global = true, env = "GATEWAYCTL_PROFILE")]
    pub profile: Option<String>,

    /// Path to alternate configuration file
    #[arg(long, global = true, env = "GATEWAYCTL_CONFIG_FILE")]
    pub config_file: Option<String>,

    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value = "auto")]
    pub output: OutputFormat,

    /// Enable verbose logging
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output, tables where it helps
    Auto,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Table output
    Table,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Express route gateway operations
    #[command(subcommand, visible_alias = "gw")]
    Gateway(GatewayCommands),

    /// Profile management
    #[command(subcommand, visible_alias = "prof")]
    Profile(ProfileCommands),

    /// Version information
    #[command(visible_alias = "ver")]
    Version,
}

/// Gateway commands
#[derive(Subcommand, Debug)]
pub enum GatewayCommands {
    /// Update autoscale bounds, connections and tags of a gateway
    #[command(visible_alias = "update")]
    #[command(after_help = "EXAMPLES:
    # By resource group and name
    gatewayctl gateway set -g rg1 -n gw1 --min-bounds 2 --max-bounds 10

    # By resource id, replacing connections
    gatewayctl gateway set \\
        --resource-id /subscriptions/<sub>/resourceGroups/rg1/providers/Microsoft.Network/expressRouteGateways/gw1 \\
        --min-bounds 2 --max-bounds 10 \\
        --connections '[{\"name\":\"c1\",\"expressRouteCircuitPeering\":\"/subscriptions/...\"}]'

    # From a gateway read on stdin, in the background
    gatewayctl gateway get -g rg1 -n gw1 -o json | \\
        gatewayctl gateway set --input-object - --min-bounds 1 --max-bounds 3 --force --as-job

    # Clear all connections
    gatewayctl gateway set -g rg1 -n gw1 --min-bounds 1 --max-bounds 2 --connections '[]'
")]
    Set(SetGatewayArgs),

    /// Show a gateway
    #[command(visible_alias = "show")]
    Get(GetGatewayArgs),
}

/// Arguments for `gateway set`
#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("identity")
        .required(true)
        .args(["name", "input_object", "resource_id"])
))]
pub struct SetGatewayArgs {
    /// Resource group of the gateway
    #[arg(
        long,
        short = 'g',
        requires = "name",
        conflicts_with_all = ["input_object", "resource_id"]
    )]
    pub resource_group: Option<String>,

    /// Gateway name
    #[arg(
        long,
        short = 'n',
        requires = "resource_group",
        visible_aliases = ["resource-name", "express-route-gateway-name", "gateway-name"]
    )]
    pub name: Option<String>,

    /// Gateway as JSON: @file, or - for stdin (as printed by `gateway get -o json`)
    #[arg(long, value_name = "@FILE|-")]
    pub input_object: Option<String>,

    /// Fully-qualified resource id of the gateway
    #[arg(long)]
    pub resource_id: Option<String>,

    /// Minimum scale units
    #[arg(long)]
    pub min_bounds: u32,

    /// Maximum scale units
    #[arg(long)]
    pub max_bounds: u32,

    /// Connections as a JSON array, or @file. Replaces the existing list.
    #[arg(long, value_name = "JSON|@FILE")]
    pub connections: Option<String>,

    /// Tag to set, repeatable. Replaces all existing tags when given.
    #[arg(long = "tag", value_name = "KEY=VALUE", value_parser = parse_tag)]
    pub tags: Vec<(String, String)>,

    /// Skip the confirmation prompt
    #[arg(long, short)]
    pub force: bool,

    /// Run the update as a background job and wait on it
    #[arg(long, requires = "force")]
    pub as_job: bool,
}

/// Arguments for `gateway get`
#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("identity")
        .required(true)
        .args(["name", "resource_id"])
))]
pub struct GetGatewayArgs {
    /// Resource group of the gateway
    #[arg(long, short = 'g', requires = "name", conflicts_with = "resource_id")]
    pub resource_group: Option<String>,

    /// Gateway name
    #[arg(
        long,
        short = 'n',
        requires = "resource_group",
        visible_aliases = ["resource-name", "express-route-gateway-name", "gateway-name"]
    )]
    pub name: Option<String>,

    /// Fully-qualified resource id of the gateway
    #[arg(long)]
    pub resource_id: Option<String>,
}

/// Profile management commands
#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// List all configured profiles
    #[command(visible_alias = "ls")]
    List,

    /// Show the path to the configuration file
    Path,

    /// Show details of a specific profile
    #[command(visible_alias = "get")]
    Show {
        /// Profile name to show
        name: String,
    },

    /// Set or create a profile
    #[command(visible_alias = "add")]
    #[command(after_help = "EXAMPLES:
    # Create a profile reading the token from the environment on each call
    gatewayctl profile set prod \\
        --subscription-id 00000000-0000-0000-0000-000000000000 \\
        --access-token '${GATEWAYCTL_TOKEN}'

    # Point a profile at another endpoint
    gatewayctl profile set local --subscription-id sub-1 --api-url http://localhost:8080
")]
    Set {
        /// Profile name
        name: String,

        /// Subscription holding the gateways
        #[arg(long)]
        subscription_id: String,

        /// Resource manager endpoint
        #[arg(long)]
        api_url: Option<String>,

        /// Bearer token, or a ${VAR} reference expanded when a client is built
        #[arg(long)]
        access_token: Option<String>,

        /// API version for gateway calls
        #[arg(long)]
        api_version: Option<String>,

        /// Seconds to wait for a long-running update
        #[arg(long)]
        operation_timeout: Option<u64>,

        /// Seconds between long-running operation polls
        #[arg(long)]
        poll_interval: Option<u64>,

        /// Make this the default profile
        #[arg(long)]
        default: bool,
    },

    /// Remove a profile
    #[command(visible_alias = "rm")]
    Remove {
        /// Profile name to remove
        name: String,
    },

    /// Set the default profile
    #[command(visible_alias = "def")]
    Default {
        /// Profile name to make default
        name: String,
    },
}

/// Parse a `key=value` tag
fn parse_tag(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid tag '{s}': expected KEY=VALUE"))?;
    if key.trim().is_empty() {
        return Err(format!("invalid tag '{s}': key must not be empty"));
    }
    Ok((key.trim().to_string(), value.to_string()))
}

//! `gateway set` and `gateway get`

use std::sync::Arc;
use std::time::Duration;

use colored::Colorize;
use comfy_table::Table;
use gatewayctl_core::{
    ConfirmationGate, Connection, ForceConfirmation, Gateway, GatewayIdentity, GatewayStore,
    ProgressCallback, ProgressEvent, Tags, UpdateGatewayParams, UpdateGatewayRequest,
    UpdateOutcome, spawn_update_gateway, update_gateway, validate,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use crate::cli::{GatewayCommands, GetGatewayArgs, OutputFormat, SetGatewayArgs};
use crate::commands::utils::{PromptConfirmation, parse_json_input};
use crate::connection::ConnectionManager;
use crate::error::{CliError, Result as CliResult};
use crate::output::{self, format_value, print_output};

pub async fn handle_gateway_command(
    gateway_cmd: &GatewayCommands,
    conn_mgr: &ConnectionManager,
    profile_name: Option<&str>,
    output_format: OutputFormat,
) -> CliResult<()> {
    match gateway_cmd {
        GatewayCommands::Set(args) => handle_set(conn_mgr, profile_name, args, output_format).await,
        GatewayCommands::Get(args) => handle_get(conn_mgr, profile_name, args, output_format).await,
    }
}

async fn handle_set(
    conn_mgr: &ConnectionManager,
    profile_name: Option<&str>,
    args: &SetGatewayArgs,
    output_format: OutputFormat,
) -> CliResult<()> {
    let request = build_update_request(args)?;
    let spinner = new_spinner();
    let client = conn_mgr.create_arm_client(profile_name, Some(spinner_callback(&spinner)))?;

    let outcome = if args.as_job {
        let job = spawn_update_gateway(Arc::new(client), request, Arc::new(ForceConfirmation));
        info!("Started background job: {}", job.description());
        spinner.enable_steady_tick(Duration::from_millis(120));
        spinner.set_message(format!("Job: {}", job.description()));
        let result = job.wait().await;
        spinner.finish_and_clear();
        result?
    } else {
        let gate: &dyn ConfirmationGate = if args.force {
            &ForceConfirmation
        } else {
            &PromptConfirmation
        };
        let result = update_gateway(&client, request, gate).await;
        spinner.finish_and_clear();
        result?
    };

    match outcome {
        UpdateOutcome::Persisted(gateway) => print_gateway(&gateway, output_format),
        UpdateOutcome::Aborted => {
            eprintln!("{}", "Operation cancelled".yellow());
            Ok(())
        }
    }
}

async fn handle_get(
    conn_mgr: &ConnectionManager,
    profile_name: Option<&str>,
    args: &GetGatewayArgs,
    output_format: OutputFormat,
) -> CliResult<()> {
    let identity = match (&args.resource_group, &args.name, &args.resource_id) {
        (Some(rg), Some(name), None) => GatewayIdentity::by_name(rg, name),
        (None, None, Some(id)) => GatewayIdentity::by_resource_id(id),
        _ => {
            return Err(CliError::InvalidInput {
                message: "specify either --resource-group with --name, or --resource-id"
                    .to_string(),
            });
        }
    };

    let resolved = identity.resolve()?;
    let client = conn_mgr.create_arm_client(profile_name, None)?;
    debug!(
        "Fetching gateway {}/{}",
        resolved.resource_group_name, resolved.name
    );

    let existing = client
        .fetch_gateway(&resolved.resource_group_name, &resolved.name)
        .await
        .map_err(CliError::from)?;
    let gateway = validate::ensure_exists(existing, &resolved.resource_group_name, &resolved.name)?;

    print_gateway(&gateway, output_format)
}

/// Turn parsed arguments into a pipeline request
pub fn build_update_request(args: &SetGatewayArgs) -> CliResult<UpdateGatewayRequest> {
    let identity = match (
        &args.resource_group,
        &args.name,
        &args.input_object,
        &args.resource_id,
    ) {
        (Some(rg), Some(name), None, None) => GatewayIdentity::by_name(rg, name),
        (None, None, Some(input), None) => {
            let gateway: Gateway = parse_json_input("--input-object", input)?;
            GatewayIdentity::by_object(gateway)
        }
        (None, None, None, Some(id)) => GatewayIdentity::by_resource_id(id),
        _ => {
            return Err(CliError::InvalidInput {
                message: "specify exactly one of --resource-group/--name, --input-object or --resource-id"
                    .to_string(),
            });
        }
    };

    let mut params = UpdateGatewayParams::new(args.min_bounds, args.max_bounds);
    if let Some(connections) = &args.connections {
        let connections: Vec<Connection> = parse_json_input("--connections", connections)?;
        params = params.with_connections(connections);
    }
    if !args.tags.is_empty() {
        let tags: Tags = args.tags.iter().cloned().collect();
        params = params.with_tags(tags);
    }

    Ok(UpdateGatewayRequest::new(identity, params))
}

fn new_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed_precise}]") {
        pb.set_style(style);
    }
    pb
}

/// Drive the spinner from long-running operation events
fn spinner_callback(pb: &ProgressBar) -> ProgressCallback {
    let pb = pb.clone();
    Arc::new(move |event: ProgressEvent| match event {
        ProgressEvent::Started { .. } => {
            pb.enable_steady_tick(Duration::from_millis(120));
            pb.set_message("Update accepted, waiting for completion");
        }
        ProgressEvent::Polling { status, .. } => {
            pb.set_message(format!("Provisioning: {}", format_operation_state(&status)));
        }
        ProgressEvent::Completed { .. } => {
            pb.set_message(format!("Provisioning: {}", format_operation_state("Succeeded")));
        }
        ProgressEvent::Failed { error, .. } => {
            pb.set_message(format!("Provisioning failed: {}", error));
        }
    })
}

/// Format operation state for display with status icons
fn format_operation_state(state: &str) -> String {
    match state.to_lowercase().as_str() {
        "succeeded" => format!("\u{2713} {}", state),
        "failed" => format!("\u{2717} {}", state),
        "canceled" | "cancelled" => format!("\u{2298} {}", state),
        _ => format!("\u{21bb} {}", state),
    }
}

fn print_gateway(gateway: &Gateway, output_format: OutputFormat) -> CliResult<()> {
    match output::OutputFormat::from(output_format) {
        output::OutputFormat::Table => {
            print_gateway_table(gateway);
            Ok(())
        }
        fmt => Ok(print_output(gateway, fmt)?),
    }
}

fn print_gateway_table(gateway: &Gateway) {
    let mut table = Table::new();
    table.set_header(vec!["Field", "Value"]);
    let or_dash = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());

    table.add_row(vec!["Name".to_string(), gateway.name.clone()]);
    table.add_row(vec![
        "Resource group".to_string(),
        gateway.resource_group_name.clone(),
    ]);
    table.add_row(vec!["Location".to_string(), or_dash(&gateway.location)]);
    table.add_row(vec![
        "Provisioning state".to_string(),
        or_dash(&gateway.provisioning_state),
    ]);
    table.add_row(vec![
        "Min bounds".to_string(),
        gateway.auto_scale_bounds.min.to_string(),
    ]);
    table.add_row(vec![
        "Max bounds".to_string(),
        gateway.auto_scale_bounds.max.to_string(),
    ]);
    table.add_row(vec!["Virtual hub".to_string(), or_dash(&gateway.virtual_hub)]);
    let tags = if gateway.tags.is_empty() {
        "-".to_string()
    } else {
        gateway
            .tags
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", ")
    };
    table.add_row(vec!["Tags".to_string(), tags]);
    println!("{table}");

    if gateway.connections.is_empty() {
        println!("No connections");
        return;
    }

    let mut connections = Table::new();
    connections.set_header(vec!["Connection", "Circuit peering", "Routing weight", "State"]);
    for connection in &gateway.connections {
        connections.add_row(vec![
            connection.name.clone(),
            or_dash(&connection.express_route_circuit_peering),
            connection
                .routing_weight
                .map(|w| w.to_string())
                .unwrap_or_else(|| format_value(&serde_json::Value::Null)),
            or_dash(&connection.provisioning_state),
        ]);
    }
    println!("{connections}");
}

//! Gateway update workflow
//!
//! One pass, no retries:
//!
//! ```text
//! resolve identity -> fetch (unless an object was given) -> validate
//!     -> mutate -> confirm -> persist
//! ```
//!
//! Every stage short-circuits on failure. The gateway is only ever changed in
//! memory until the single create-or-update call, so a failure never leaves a
//! partial update behind.

use crate::confirm::ConfirmationGate;
use crate::error::{CoreError, Result};
use crate::gateway::Gateway;
use crate::identity::GatewayIdentity;
use crate::params::UpdateGatewayParams;
use crate::store::GatewayStore;
use crate::validate;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// A complete update request: which gateway and what to change
#[derive(Debug, Clone)]
pub struct UpdateGatewayRequest {
    pub identity: GatewayIdentity,
    pub params: UpdateGatewayParams,
}

impl UpdateGatewayRequest {
    #[must_use]
    pub fn new(identity: GatewayIdentity, params: UpdateGatewayParams) -> Self {
        Self { identity, params }
    }
}

/// How an update ended, when it did not fail
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// The store accepted the change; this is its view of the gateway
    Persisted(Gateway),
    /// The confirmation gate declined; nothing was written
    Aborted,
}

impl UpdateOutcome {
    /// The persisted gateway, if any
    #[must_use]
    pub fn gateway(&self) -> Option<&Gateway> {
        match self {
            UpdateOutcome::Persisted(gateway) => Some(gateway),
            UpdateOutcome::Aborted => None,
        }
    }

    #[must_use]
    pub fn is_aborted(&self) -> bool {
        matches!(self, UpdateOutcome::Aborted)
    }
}

/// Text shown to the confirmation gate
#[must_use]
pub fn describe_update(resource_group_name: &str, name: &str) -> String {
    format!("set express route gateway '{name}' in resource group '{resource_group_name}'")
}

/// Update a gateway's autoscale bounds and connections
///
/// # Example
///
/// ```rust,ignore
/// use gatewayctl_core::{
///     ForceConfirmation, GatewayIdentity, UpdateGatewayParams, UpdateGatewayRequest,
///     update_gateway,
/// };
///
/// let request = UpdateGatewayRequest::new(
///     GatewayIdentity::by_name("rg1", "gw1"),
///     UpdateGatewayParams::new(2, 10),
/// );
///
/// let outcome = update_gateway(&client, request, &ForceConfirmation).await?;
/// ```
pub async fn update_gateway(
    store: &dyn GatewayStore,
    request: UpdateGatewayRequest,
    gate: &dyn ConfirmationGate,
) -> Result<UpdateOutcome> {
    let UpdateGatewayRequest { identity, params } = request;

    // Step 1: Resolve identity
    let resolved = identity.resolve()?;
    let resource_group_name = resolved.resource_group_name;
    let name = resolved.name;

    // Step 2: Fetch, unless the caller handed us the gateway
    let existing = match resolved.gateway {
        Some(gateway) => Some(gateway),
        None => {
            debug!(resource_group = %resource_group_name, gateway = %name, "Fetching gateway");
            store.fetch_gateway(&resource_group_name, &name).await?
        }
    };

    // Step 3: Validate before touching anything
    let mut gateway = validate::ensure_exists(existing, &resource_group_name, &name)?;
    let bounds = validate::check_bounds(params.min_bounds, params.max_bounds)?;

    // Step 4: Mutate the in-memory copy
    params.apply_to(&mut gateway, bounds);
    debug!(
        min = bounds.min,
        max = bounds.max,
        connections = gateway.connections.len(),
        replaced_connections = params.connections.is_some(),
        "Applied update"
    );

    // Step 5: Confirm
    let description = describe_update(&resource_group_name, &name);
    if !gate.should_proceed(&description)? {
        info!(resource_group = %resource_group_name, gateway = %name, "Update declined");
        return Ok(UpdateOutcome::Aborted);
    }

    // Step 6: Persist
    info!(
        "Updating long running operation for resource group {} and gateway {}",
        resource_group_name, name
    );
    let updated = store
        .create_or_update_gateway(&resource_group_name, &name, &gateway, params.tags.as_ref())
        .await?;

    Ok(UpdateOutcome::Persisted(updated))
}

/// Handle to an update running on a background task
#[derive(Debug)]
pub struct UpdateJob {
    description: String,
    handle: JoinHandle<Result<UpdateOutcome>>,
}

impl UpdateJob {
    /// What the job is doing, for display
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether the job has finished
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the job and return its result
    pub async fn wait(self) -> Result<UpdateOutcome> {
        match self.handle.await {
            Ok(result) => result,
            Err(e) => Err(CoreError::JobFailed(e.to_string())),
        }
    }
}

/// Run [`update_gateway`] on a spawned tokio task
///
/// Only scheduling changes; the pipeline is the same. Must be called from
/// within a tokio runtime.
pub fn spawn_update_gateway(
    store: Arc<dyn GatewayStore>,
    request: UpdateGatewayRequest,
    gate: Arc<dyn ConfirmationGate>,
) -> UpdateJob {
    let description = match &request.identity {
        GatewayIdentity::ByName {
            resource_group_name,
            name,
        } => describe_update(resource_group_name, name),
        GatewayIdentity::ByObject(gateway) => {
            describe_update(&gateway.resource_group_name, &gateway.name)
        }
        GatewayIdentity::ByResourceId(resource_id) => {
            format!("set express route gateway '{resource_id}'")
        }
    };
    debug!(job = %description, "Starting background update");

    let handle = tokio::spawn(async move {
        update_gateway(store.as_ref(), request, gate.as_ref()).await
    });

    UpdateJob {
        description,
        handle,
    }
}

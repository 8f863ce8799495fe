//! # gatewayctl-core
//!
//! Shared engine behind the `gatewayctl` CLI: identify an express route
//! gateway, validate a requested change, apply it and persist it through the
//! resource manager API.
//!
//! ## Layers
//!
//! - **Model** - [`Gateway`], [`Connection`], [`AutoScaleBounds`]
//! - **Identity** - [`GatewayIdentity`] (by name, by object, by resource id)
//!   and [`ResourceIdentifier`] parsing
//! - **Validation and mutation** - [`validate`], [`UpdateGatewayParams`]
//! - **Seams** - [`GatewayStore`] for the remote side, [`ConfirmationGate`]
//!   for approval
//! - **Workflows** - [`update_gateway`] and its background form
//!   [`spawn_update_gateway`]
//! - **Transport** - [`ArmClient`], the HTTP [`GatewayStore`]
//! - **Config** - profiles, endpoints and tokens
//!
//! ## Example
//!
//! ```rust,ignore
//! use gatewayctl_core::{
//!     ArmClient, ArmClientConfig, ForceConfirmation, GatewayIdentity, UpdateGatewayParams,
//!     UpdateGatewayRequest, UpdateOutcome, update_gateway,
//! };
//!
//! let client = ArmClient::new(ArmClientConfig::new("my-subscription").with_access_token(token))?;
//! let request = UpdateGatewayRequest::new(
//!     GatewayIdentity::by_resource_id(resource_id),
//!     UpdateGatewayParams::new(2, 10),
//! );
//!
//! if let UpdateOutcome::Persisted(gateway) = update_gateway(&client, request, &ForceConfirmation).await? {
//!     println!("{} now scales {}..{}", gateway.name, gateway.auto_scale_bounds.min, gateway.auto_scale_bounds.max);
//! }
//! ```

pub mod arm;
pub mod config;
pub mod confirm;
pub mod error;
pub mod gateway;
pub mod identity;
pub mod params;
pub mod progress;
pub mod resource_id;
pub mod store;
pub mod validate;
pub mod workflows;

pub use arm::{ArmClient, ArmClientConfig};
pub use config::{Config, ConfigError, Profile};
pub use confirm::{ConfirmationGate, ForceConfirmation};
pub use error::{CoreError, Result};
pub use gateway::{AutoScaleBounds, Connection, Gateway, Tags};
pub use identity::{GatewayIdentity, ResolvedIdentity};
pub use params::UpdateGatewayParams;
pub use progress::{OperationStatus, ProgressCallback, ProgressEvent, poll_operation};
pub use resource_id::{ParseResourceIdError, ResourceIdentifier};
pub use store::{ApiError, GatewayStore};
pub use workflows::{
    UpdateGatewayRequest, UpdateJob, UpdateOutcome, describe_update, spawn_update_gateway,
    update_gateway,
};

//! Gateway identity resolution
//!
//! A caller names the gateway in exactly one of three ways. Each way becomes
//! a canonical `(resource_group_name, name)` pair; the object form also hands
//! back the gateway itself so no fetch is needed.

use crate::error::{CoreError, Result};
use crate::gateway::Gateway;
use crate::resource_id::ResourceIdentifier;
use tracing::{debug, warn};

/// Resource type the resource-id form is expected to carry
pub const GATEWAY_RESOURCE_TYPE: &str = "Microsoft.Network/expressRouteGateways";

/// How the caller identified the gateway
#[derive(Debug, Clone)]
pub enum GatewayIdentity {
    /// Resource group and gateway name, used verbatim
    ByName {
        resource_group_name: String,
        name: String,
    },
    /// An already-materialized gateway
    ByObject(Box<Gateway>),
    /// A fully-qualified resource id
    ByResourceId(String),
}

/// Result of resolving a [`GatewayIdentity`]
#[derive(Debug, Clone)]
pub struct ResolvedIdentity {
    pub resource_group_name: String,
    pub name: String,
    /// Present only for [`GatewayIdentity::ByObject`]
    pub gateway: Option<Gateway>,
}

impl GatewayIdentity {
    #[must_use]
    pub fn by_name(resource_group_name: impl Into<String>, name: impl Into<String>) -> Self {
        GatewayIdentity::ByName {
            resource_group_name: resource_group_name.into(),
            name: name.into(),
        }
    }

    #[must_use]
    pub fn by_object(gateway: Gateway) -> Self {
        GatewayIdentity::ByObject(Box::new(gateway))
    }

    #[must_use]
    pub fn by_resource_id(resource_id: impl Into<String>) -> Self {
        GatewayIdentity::ByResourceId(resource_id.into())
    }

    /// Resolve to a `(resource_group_name, name)` pair
    pub fn resolve(self) -> Result<ResolvedIdentity> {
        let resolved = match self {
            GatewayIdentity::ByName {
                resource_group_name,
                name,
            } => ResolvedIdentity {
                resource_group_name,
                name,
                gateway: None,
            },
            GatewayIdentity::ByObject(gateway) => ResolvedIdentity {
                resource_group_name: gateway.resource_group_name.clone(),
                name: gateway.name.clone(),
                gateway: Some(*gateway),
            },
            GatewayIdentity::ByResourceId(resource_id) => {
                let parsed = ResourceIdentifier::parse(&resource_id)?;
                if !parsed.is_type(GATEWAY_RESOURCE_TYPE) {
                    warn!(
                        resource_type = %parsed.resource_type,
                        "Resource id does not point at an express route gateway"
                    );
                }
                ResolvedIdentity {
                    resource_group_name: parsed.resource_group_name,
                    name: parsed.resource_name,
                    gateway: None,
                }
            }
        };

        if resolved.resource_group_name.trim().is_empty() {
            return Err(CoreError::Validation(
                "resource group name must not be empty".to_string(),
            ));
        }
        if resolved.name.trim().is_empty() {
            return Err(CoreError::Validation(
                "gateway name must not be empty".to_string(),
            ));
        }

        debug!(
            resource_group = %resolved.resource_group_name,
            gateway = %resolved.name,
            prefetched = resolved.gateway.is_some(),
            "Resolved gateway identity"
        );
        Ok(resolved)
    }
}

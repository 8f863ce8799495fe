//! Gateway domain model
//!
//! These are the caller-facing shapes: what `gateway get` prints and what
//! `gateway set --input-object` reads back. The remote wire format lives in
//! [`crate::arm`] and is mapped to and from these types there.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Resource tags, ordered by key for stable output
pub type Tags = BTreeMap<String, String>;

/// An ExpressRoute gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gateway {
    /// Resource group containing the gateway
    pub resource_group_name: String,
    /// Gateway name
    pub name: String,
    /// Fully-qualified resource id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "type")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
    /// Resource id of the virtual hub the gateway belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virtual_hub: Option<String>,
    /// Scale unit range
    #[serde(default)]
    pub auto_scale_bounds: AutoScaleBounds,
    /// Downstream connections, in order
    #[serde(default)]
    pub connections: Vec<Connection>,
    #[serde(default)]
    pub tags: Tags,
}

impl Gateway {
    /// Create a gateway with only its identity set
    #[must_use]
    pub fn new(resource_group_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            resource_group_name: resource_group_name.into(),
            name: name.into(),
            id: None,
            resource_type: None,
            location: None,
            etag: None,
            provisioning_state: None,
            virtual_hub: None,
            auto_scale_bounds: AutoScaleBounds::default(),
            connections: Vec::new(),
            tags: Tags::new(),
        }
    }

    /// Set the autoscale bounds
    #[must_use]
    pub fn with_bounds(mut self, min: i32, max: i32) -> Self {
        self.auto_scale_bounds = AutoScaleBounds { min, max };
        self
    }

    /// Set the connections
    #[must_use]
    pub fn with_connections(mut self, connections: Vec<Connection>) -> Self {
        self.connections = connections;
        self
    }

    /// Add a tag
    #[must_use]
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Set the location
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the virtual hub reference
    #[must_use]
    pub fn with_virtual_hub(mut self, virtual_hub: impl Into<String>) -> Self {
        self.virtual_hub = Some(virtual_hub.into());
        self
    }

    /// Human-readable `resource_group/name` label
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{}/{}", self.resource_group_name, self.name)
    }
}

/// Minimum and maximum scale units.
///
/// The entity itself does not enforce `min <= max`; that is checked by
/// [`crate::validate`] before anything is persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoScaleBounds {
    pub min: i32,
    pub max: i32,
}

/// A connection between the gateway and an ExpressRoute circuit peering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Resource id of the circuit peering this connection attaches to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub express_route_circuit_peering: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing_weight: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

impl Connection {
    /// Create a connection with just a name
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            express_route_circuit_peering: None,
            authorization_key: None,
            routing_weight: None,
            provisioning_state: None,
        }
    }

    /// Set the circuit peering reference
    #[must_use]
    pub fn with_circuit_peering(mut self, peering_id: impl Into<String>) -> Self {
        self.express_route_circuit_peering = Some(peering_id.into());
        self
    }

    /// Set the routing weight
    #[must_use]
    pub fn with_routing_weight(mut self, weight: i32) -> Self {
        self.routing_weight = Some(weight);
        self
    }
}

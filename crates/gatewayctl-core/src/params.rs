//! Parameters for the gateway update
//!
//! Bounds are required; connections and tags are only applied when given.

use crate::gateway::{AutoScaleBounds, Connection, Gateway, Tags};

/// What to change on the gateway
///
/// # Example
///
/// ```rust
/// use gatewayctl_core::{Connection, UpdateGatewayParams};
///
/// let params = UpdateGatewayParams::new(2, 10)
///     .with_connections(vec![Connection::new("c1"), Connection::new("c2")])
///     .with_tag("env", "prod");
///
/// assert_eq!(params.min_bounds, 2);
/// assert_eq!(params.connections.as_ref().map(Vec::len), Some(2));
/// ```
#[derive(Debug, Clone, Default)]
pub struct UpdateGatewayParams {
    /// Minimum scale units (required)
    pub min_bounds: u32,
    /// Maximum scale units (required)
    pub max_bounds: u32,
    /// Replacement connection list; `None` keeps the current connections
    pub connections: Option<Vec<Connection>>,
    /// Tags for the persisted gateway; `None` keeps the current tags
    pub tags: Option<Tags>,
}

impl UpdateGatewayParams {
    /// Create params with the required bounds
    #[must_use]
    pub fn new(min_bounds: u32, max_bounds: u32) -> Self {
        Self {
            min_bounds,
            max_bounds,
            connections: None,
            tags: None,
        }
    }

    /// Replace the gateway's connections with these
    #[must_use]
    pub fn with_connections(mut self, connections: Vec<Connection>) -> Self {
        self.connections = Some(connections);
        self
    }

    /// Set all tags at once
    #[must_use]
    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags = Some(tags);
        self
    }

    /// Add a single tag
    #[must_use]
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags
            .get_or_insert_with(Tags::new)
            .insert(key.into(), value.into());
        self
    }

    /// Apply validated bounds and the connection list to `gateway`.
    ///
    /// A supplied connection list replaces the current one wholesale, in the
    /// given order; an explicitly empty list clears it. Tags are not touched
    /// here, they go to the store alongside the gateway.
    pub fn apply_to(&self, gateway: &mut Gateway, bounds: AutoScaleBounds) {
        gateway.auto_scale_bounds = bounds;

        if let Some(connections) = &self.connections {
            gateway.connections = connections.clone();
        }
    }
}

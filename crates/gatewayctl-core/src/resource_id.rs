//! Fully-qualified resource identifiers
//!
//! A resource id has the shape
//!
//! ```text
//! /subscriptions/{sub}/resourceGroups/{rg}/providers/{namespace}/{type}/{name}[/{child-type}/{child-name}...]
//! ```
//!
//! Key segments are matched case-insensitively, values are kept verbatim.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a resource id cannot be parsed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid resource id '{id}': {reason}")]
pub struct ParseResourceIdError {
    pub id: String,
    pub reason: String,
}

impl ParseResourceIdError {
    fn new(id: &str, reason: impl Into<String>) -> Self {
        Self {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}

/// Parsed resource identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceIdentifier {
    pub subscription_id: String,
    pub resource_group_name: String,
    pub provider_namespace: String,
    /// Full type, e.g. `Microsoft.Network/expressRouteGateways`
    pub resource_type: String,
    /// `type/name` path of the parent for nested resources
    pub parent_resource: Option<String>,
    pub resource_name: String,
}

impl ResourceIdentifier {
    /// Parse a resource id string
    pub fn parse(id: &str) -> Result<Self, ParseResourceIdError> {
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(ParseResourceIdError::new(id, "resource id is empty"));
        }
        if !trimmed.starts_with('/') {
            return Err(ParseResourceIdError::new(id, "resource id must start with '/'"));
        }

        let tokens: Vec<&str> = trimmed.split('/').filter(|t| !t.is_empty()).collect();
        if tokens.len() < 8 {
            return Err(ParseResourceIdError::new(
                id,
                format!("expected at least 8 segments, found {}", tokens.len()),
            ));
        }

        expect_key(id, tokens[0], "subscriptions")?;
        expect_key(id, tokens[2], "resourceGroups")?;
        expect_key(id, tokens[4], "providers")?;

        let provider_namespace = tokens[5];
        let type_name_pairs = &tokens[6..];
        if type_name_pairs.len() % 2 != 0 {
            return Err(ParseResourceIdError::new(
                id,
                "resource type and name segments must come in pairs",
            ));
        }

        let pairs: Vec<(&str, &str)> = type_name_pairs
            .chunks_exact(2)
            .map(|pair| (pair[0], pair[1]))
            .collect();

        let resource_type = std::iter::once(provider_namespace)
            .chain(pairs.iter().map(|(t, _)| *t))
            .collect::<Vec<_>>()
            .join("/");

        let parent_resource = match pairs.split_last() {
            Some((_, parents)) if !parents.is_empty() => Some(
                parents
                    .iter()
                    .map(|(t, n)| format!("{t}/{n}"))
                    .collect::<Vec<_>>()
                    .join("/"),
            ),
            _ => None,
        };

        let resource_name = pairs
            .last()
            .map(|(_, n)| (*n).to_string())
            .ok_or_else(|| ParseResourceIdError::new(id, "missing resource name"))?;

        Ok(Self {
            subscription_id: tokens[1].to_string(),
            resource_group_name: tokens[3].to_string(),
            provider_namespace: provider_namespace.to_string(),
            resource_type,
            parent_resource,
            resource_name,
        })
    }

    /// Check the resource type, ignoring case
    #[must_use]
    pub fn is_type(&self, resource_type: &str) -> bool {
        self.resource_type.eq_ignore_ascii_case(resource_type)
    }
}

fn expect_key(id: &str, actual: &str, expected: &str) -> Result<(), ParseResourceIdError> {
    if actual.eq_ignore_ascii_case(expected) {
        Ok(())
    } else {
        Err(ParseResourceIdError::new(
            id,
            format!("expected '{expected}' segment, found '{actual}'"),
        ))
    }
}

impl FromStr for ResourceIdentifier {
    type Err = ParseResourceIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ResourceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "/subscriptions/{}/resourceGroups/{}/providers/{}",
            self.subscription_id, self.resource_group_name, self.provider_namespace
        )?;
        if let Some(parent) = &self.parent_resource {
            write!(f, "/{parent}")?;
        }
        let leaf_type = self
            .resource_type
            .rsplit('/')
            .next()
            .unwrap_or(&self.resource_type);
        write!(f, "/{}/{}", leaf_type, self.resource_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GATEWAY_ID: &str = "/subscriptions/s/resourceGroups/rg1/providers/Microsoft.Network/expressRouteGateways/gw1";

    #[test]
    fn test_parse_gateway_id() {
        let id = ResourceIdentifier::parse(GATEWAY_ID).unwrap();
        assert_eq!(id.subscription_id, "s");
        assert_eq!(id.resource_group_name, "rg1");
        assert_eq!(id.provider_namespace, "Microsoft.Network");
        assert_eq!(id.resource_type, "Microsoft.Network/expressRouteGateways");
        assert_eq!(id.parent_resource, None);
        assert_eq!(id.resource_name, "gw1");
        assert!(id.is_type("microsoft.network/expressroutegateways"));
    }

    #[test]
    fn test_parse_nested_id() {
        let id = ResourceIdentifier::parse(
            "/subscriptions/s/resourceGroups/rg1/providers/Microsoft.Network/expressRouteGateways/gw1/expressRouteConnections/c1",
        )
        .unwrap();
        assert_eq!(id.resource_name, "c1");
        assert_eq!(
            id.resource_type,
            "Microsoft.Network/expressRouteGateways/expressRouteConnections"
        );
        assert_eq!(id.parent_resource.as_deref(), Some("expressRouteGateways/gw1"));
    }

    #[test]
    fn test_parse_is_case_insensitive_on_keys() {
        let id = ResourceIdentifier::parse(
            "/SUBSCRIPTIONS/s/resourcegroups/RG1/Providers/Microsoft.Network/expressRouteGateways/GW1",
        )
        .unwrap();
        assert_eq!(id.resource_group_name, "RG1");
        assert_eq!(id.resource_name, "GW1");
    }

    #[test]
    fn test_parse_tolerates_trailing_slash_and_whitespace() {
        let id = ResourceIdentifier::parse(&format!("  {GATEWAY_ID}/ ")).unwrap();
        assert_eq!(id.resource_name, "gw1");
    }

    #[test]
    fn test_parse_rejects_malformed_ids() {
        for bad in [
            "",
            "   ",
            "gw1",
            "subscriptions/s/resourceGroups/rg1/providers/Microsoft.Network/expressRouteGateways/gw1",
            "/subscriptions/s/resourceGroups/rg1",
            "/subscriptions/s/resourceGroups/rg1/providers/Microsoft.Network/expressRouteGateways",
            "/subscriptions/s/resourceGroups/rg1/providers/Microsoft.Network/expressRouteGateways/gw1/extra",
            "/subscriptions/s/groups/rg1/providers/Microsoft.Network/expressRouteGateways/gw1",
        ] {
            assert!(ResourceIdentifier::parse(bad).is_err(), "should reject {bad:?}");
        }
    }

    #[test]
    fn test_error_names_the_input() {
        let err = ResourceIdentifier::parse("/subscriptions/s").unwrap_err();
        assert_eq!(err.id, "/subscriptions/s");
        assert!(err.to_string().contains("/subscriptions/s"));
    }

    #[test]
    fn test_display_round_trips() {
        let id: ResourceIdentifier = GATEWAY_ID.parse().unwrap();
        assert_eq!(id.to_string(), GATEWAY_ID);
    }
}

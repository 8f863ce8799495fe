//! Pre-mutation checks
//!
//! Run in order: existence, then bounds ordering, then bounds range. Nothing
//! here touches the gateway, so a failed check leaves it exactly as fetched.

use crate::error::{CoreError, Result};
use crate::gateway::{AutoScaleBounds, Gateway};

/// Require that a gateway was resolved
pub fn ensure_exists(
    gateway: Option<Gateway>,
    resource_group_name: &str,
    name: &str,
) -> Result<Gateway> {
    gateway.ok_or_else(|| CoreError::NotFound {
        resource_group_name: resource_group_name.to_string(),
        name: name.to_string(),
    })
}

/// Check requested bounds and convert them to the gateway's signed fields
pub fn check_bounds(min: u32, max: u32) -> Result<AutoScaleBounds> {
    if min > max {
        return Err(CoreError::InvalidBounds { min, max });
    }

    Ok(AutoScaleBounds {
        min: narrow("min", min)?,
        max: narrow("max", max)?,
    })
}

fn narrow(field: &'static str, value: u32) -> Result<i32> {
    i32::try_from(value).map_err(|_| CoreError::BoundsOutOfRange { field, value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_exists_passes_gateway_through() {
        let gateway = Gateway::new("rg1", "gw1").with_bounds(1, 5);
        let result = ensure_exists(Some(gateway.clone()), "rg1", "gw1").unwrap();
        assert_eq!(result, gateway);
    }

    #[test]
    fn test_ensure_exists_names_the_identity() {
        match ensure_exists(None, "rg1", "gw1") {
            Err(CoreError::NotFound {
                resource_group_name,
                name,
            }) => {
                assert_eq!(resource_group_name, "rg1");
                assert_eq!(name, "gw1");
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_check_bounds_accepts_ordered_and_equal() {
        assert_eq!(
            check_bounds(2, 10).unwrap(),
            AutoScaleBounds { min: 2, max: 10 }
        );
        assert_eq!(check_bounds(3, 3).unwrap(), AutoScaleBounds { min: 3, max: 3 });
        assert_eq!(check_bounds(0, 0).unwrap(), AutoScaleBounds { min: 0, max: 0 });
    }

    #[test]
    fn test_check_bounds_rejects_inverted() {
        assert!(matches!(
            check_bounds(10, 2),
            Err(CoreError::InvalidBounds { min: 10, max: 2 })
        ));
    }

    #[test]
    fn test_check_bounds_at_signed_limit() {
        let limit = i32::MAX as u32;
        assert_eq!(
            check_bounds(limit, limit).unwrap(),
            AutoScaleBounds {
                min: i32::MAX,
                max: i32::MAX
            }
        );
    }

    #[test]
    fn test_check_bounds_rejects_values_above_signed_range() {
        let over = i32::MAX as u32 + 1;
        assert!(matches!(
            check_bounds(1, over),
            Err(CoreError::BoundsOutOfRange { field: "max", value }) if value == over
        ));
        assert!(matches!(
            check_bounds(over, u32::MAX),
            Err(CoreError::BoundsOutOfRange { field: "min", .. })
        ));
    }

    #[test]
    fn test_ordering_is_checked_before_range() {
        assert!(matches!(
            check_bounds(u32::MAX, 1),
            Err(CoreError::InvalidBounds { .. })
        ));
    }
}

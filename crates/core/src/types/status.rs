//! Status and role enums.
//!
//! Both enums are lowercase on the wire and map onto Postgres enum types
//! (`order_status`, `user_role`) when the `postgres` feature is enabled.

use serde::{Deserialize, Serialize};

/// Error returned when a status or role string is not recognised.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind}: {value:?} (expected one of: {expected})")]
pub struct UnknownVariant {
    /// Which enum was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
    /// Comma-separated accepted values.
    pub expected: &'static str,
}

/// Lifecycle of a customer order.
///
/// Orders only move forward: `pending → accepted → delivered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "order_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Placed by the customer, not yet acknowledged by the kitchen.
    Pending,
    /// Accepted by an admin and being prepared.
    Accepted,
    /// Handed over to the customer. Terminal.
    Delivered,
}

impl OrderStatus {
    /// Every status in lifecycle order.
    pub const ALL: [Self; 3] = [Self::Pending, Self::Accepted, Self::Delivered];

    /// Wire / database representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Delivered => "delivered",
        }
    }

    /// Whether an order in this status may be moved to `next`.
    ///
    /// Re-applying the current status is allowed and leaves the order
    /// unchanged.
    #[must_use]
    pub const fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Pending | Self::Accepted)
                | (Self::Accepted, Self::Accepted | Self::Delivered)
                | (Self::Delivered, Self::Delivered)
        )
    }

    /// Whether no further transitions are possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "delivered" => Ok(Self::Delivered),
            _ => Err(UnknownVariant {
                kind: "order status",
                value: s.to_owned(),
                expected: "pending, accepted, delivered",
            }),
        }
    }
}

/// Role of a locally synced user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "user_role", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Regular app customer.
    #[default]
    Customer,
    /// Restaurant staff with access to the admin panel.
    Admin,
}

impl UserRole {
    /// Wire / database representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "customer" => Ok(Self::Customer),
            "admin" => Ok(Self::Admin),
            _ => Err(UnknownVariant {
                kind: "user role",
                value: s.to_owned(),
                expected: "customer, admin",
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions_allowed() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Accepted));
        assert!(OrderStatus::Accepted.can_transition_to(OrderStatus::Delivered));
    }

    #[test]
    fn test_same_status_is_noop() {
        for status in OrderStatus::ALL {
            assert!(status.can_transition_to(status));
        }
    }

    #[test]
    fn test_skips_and_reversals_rejected() {
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Delivered));
        assert!(!OrderStatus::Accepted.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Accepted));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Pending));
    }

    #[test]
    fn test_delivered_is_terminal() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(!OrderStatus::Accepted.is_terminal());
    }

    #[test]
    fn test_status_from_str_is_case_insensitive() {
        assert_eq!(
            "Accepted".parse::<OrderStatus>().unwrap(),
            OrderStatus::Accepted
        );
        let err = "shipped".parse::<OrderStatus>().unwrap_err();
        assert_eq!(err.value, "shipped");
        assert!(err.to_string().contains("pending, accepted, delivered"));
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Delivered).unwrap(),
            "\"delivered\""
        );
        assert!(serde_json::from_str::<OrderStatus>("\"cancelled\"").is_err());
    }

    #[test]
    fn test_user_role() {
        assert_eq!(UserRole::default(), UserRole::Customer);
        assert_eq!("ADMIN".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert!("owner".parse::<UserRole>().is_err());
        assert_eq!(UserRole::Admin.to_string(), "admin");
    }
}

//! Status and channel enums.

use serde::{Deserialize, Serialize};

/// Order fulfillment status.
///
/// An order is created `Placed` or `InTransit`, becomes `Delivered` exactly
/// when the delivered transition fires, and may end up `Returned` through the
/// returns flow. Only `InTransit` orders with a delivery date are schedulable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Placed,
    InTransit,
    Delivered,
    Returned,
}

impl OrderStatus {
    /// Whether this is a terminal status (no further transitions expected).
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Returned)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Placed => write!(f, "placed"),
            Self::InTransit => write!(f, "in_transit"),
            Self::Delivered => write!(f, "delivered"),
            Self::Returned => write!(f, "returned"),
        }
    }
}

/// Transport selector for verification codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationChannel {
    Email,
    Sms,
}

impl std::fmt::Display for VerificationChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Email => write!(f, "email"),
            Self::Sms => write!(f, "sms"),
        }
    }
}

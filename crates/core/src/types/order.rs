//! Order records and the checkout draft they are created from.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::email::Email;
use crate::types::id::OrderId;
use crate::types::status::OrderStatus;

/// A single line in an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Product display name.
    pub name: String,
    /// Quantity ordered (at least 1).
    pub quantity: u32,
    /// Price per unit.
    pub unit_price: Decimal,
}

impl OrderItem {
    /// Line total (`unit_price * quantity`).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// A persisted order record.
///
/// Owned by the order store; the scheduler only reads orders and asks the
/// store to perform the delivered transition.
///
/// Invariant: `delivered_at` is set if and only if `status` is
/// [`OrderStatus::Delivered`]. An order is schedulable only while `status` is
/// [`OrderStatus::InTransit`] and `delivery_date` is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Unique identifier, assigned by the store.
    pub id: OrderId,
    /// Current fulfillment status.
    pub status: OrderStatus,
    /// Calendar day delivery is expected, if known.
    pub delivery_date: Option<DateTime<Utc>>,
    /// Set exactly when the order becomes delivered.
    pub delivered_at: Option<DateTime<Utc>>,
    /// Recipient for fulfillment notifications.
    pub customer_email: Email,
    /// Purchased items.
    pub items: Vec<OrderItem>,
    /// Sum of line totals, computed at creation.
    pub total: Decimal,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Whether the scheduler can arrange reminder/delivered transitions for
    /// this order.
    #[must_use]
    pub const fn is_schedulable(&self) -> bool {
        matches!(self.status, OrderStatus::InTransit) && self.delivery_date.is_some()
    }
}

/// What checkout hands to the order store to create an [`Order`].
///
/// The store assigns the id, stamps `created_at`, computes the total, and
/// sets the initial status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDraft {
    /// Recipient for fulfillment notifications.
    pub customer_email: Email,
    /// Purchased items (must be non-empty).
    pub items: Vec<OrderItem>,
    /// Expected delivery day; when absent the store applies its configured
    /// default window.
    pub delivery_date: Option<DateTime<Utc>>,
}

impl OrderDraft {
    /// Sum of line totals.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(OrderItem::line_total).sum()
    }
}

//! Customer orders and the sales report.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use food_admin_core::{ItemId, ItemSize, OrderId, OrderStatus, Price};

/// Largest order total in cents. Totals are stored as `NUMERIC(12,2)`.
pub const MAX_ORDER_TOTAL_CENTS: i64 = 999_999_999_999;

/// One line of an order, snapshotted at checkout.
///
/// Stored as JSONB with the field names the customer app writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<ItemId>,
    #[serde(rename = "Name")]
    pub name: String,
    pub quantity: u32,
    /// Unit price at the time of ordering.
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<ItemSize>,
}

impl OrderLine {
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// A stored order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub id: OrderId,
    /// Identity provider subject of the customer.
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(rename = "PhoneNumber")]
    pub phone_number: String,
    pub street: String,
    pub city: String,
    pub items: Vec<OrderLine>,
    pub total: Price,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    pub updated_at: DateTime<Utc>,
}

/// Where and to whom an order is delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryDetails {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub street: String,
    pub city: String,
}

/// An order about to be inserted. Always starts `pending`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: String,
    pub delivery: DeliveryDetails,
    pub items: Vec<OrderLine>,
}

impl NewOrder {
    /// Sum of line subtotals.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(OrderLine::subtotal).sum()
    }

    /// Whether the total fits the order total column.
    #[must_use]
    pub fn total_fits(&self) -> bool {
        self.total().amount() <= Decimal::new(MAX_ORDER_TOTAL_CENTS, 2)
    }
}

/// One page of orders plus aggregates over the whole filtered range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrdersReport {
    pub orders: Vec<Order>,
    pub total_count: i64,
    pub total_revenue: Price,
}

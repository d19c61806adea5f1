//! Order Models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Backend table for orders
pub const ORDERS_TABLE: &str = "orders_pos_v1";
/// Backend table for order items
pub const ORDER_ITEMS_TABLE: &str = "order_items_pos_v1";

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Ready,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Whether the order still occupies its table
    pub fn is_open(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Preparing | OrderStatus::Ready)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Preparing => write!(f, "preparing"),
            OrderStatus::Ready => write!(f, "ready"),
            OrderStatus::Completed => write!(f, "completed"),
            OrderStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Per-item kitchen status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderItemStatus {
    Pending,
    Preparing,
    Ready,
    Served,
}

/// How the order is fulfilled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderType {
    DineIn,
    Takeaway,
    Delivery,
}

impl Default for OrderType {
    fn default() -> Self {
        OrderType::DineIn
    }
}

/// Order entity
///
/// Totals are authoritative on the backend (`update_order_total`); the
/// in-memory source recomputes them locally with the same formula.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub location_id: String,
    pub table_id: Option<String>,
    pub staff_id: Option<String>,
    #[serde(default)]
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub subtotal: f64,
    pub tax: f64,
    pub tip: f64,
    pub total: f64,
    /// Parent order when this order was split off another bill
    #[serde(skip_serializing_if = "Option::is_none")]
    pub split_from: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
}

/// Order item entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub menu_item_id: String,
    pub quantity: i32,
    /// Price per unit at the time the item was added
    pub unit_price: f64,
    #[serde(default)]
    pub modifiers: Vec<String>,
    pub status: OrderItemStatus,
}

impl OrderItem {
    /// Line total for this item (unit_price × quantity, 2 decimal places)
    pub fn line_total(&self) -> f64 {
        use rust_decimal::prelude::*;

        let unit = Decimal::from_f64(self.unit_price).unwrap_or_default();
        (unit * Decimal::from(self.quantity))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            .to_f64()
            .unwrap_or_default()
    }
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub location_id: String,
    pub table_id: Option<String>,
    pub staff_id: Option<String>,
    pub order_type: OrderType,
}

/// Create order item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemCreate {
    pub order_id: String,
    pub menu_item_id: String,
    pub quantity: i32,
    pub modifiers: Vec<String>,
}

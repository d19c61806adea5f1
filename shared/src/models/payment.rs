//! Payment Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PaymentMethod;

/// Backend table for payments
pub const PAYMENTS_TABLE: &str = "payments_pos_v1";

/// Payment settlement status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

/// Payment entity — settles an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    pub order_id: String,
    pub location_id: String,
    pub amount: f64,
    pub tip: f64,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

/// Record payment payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentCreate {
    pub order_id: String,
    pub amount: f64,
    pub tip: f64,
    pub method: PaymentMethod,
}

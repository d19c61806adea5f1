//! Customer Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Backend table for customers
pub const CUSTOMERS_TABLE: &str = "customers_pos_v1";

/// Customer entity (tenant-scoped) with visit statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub visit_count: i32,
    #[serde(default)]
    pub total_spent: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_visit: Option<DateTime<Utc>>,
}

/// Create customer payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerCreate {
    pub tenant_id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Update customer payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

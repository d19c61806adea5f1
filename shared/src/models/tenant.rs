//! Tenant Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Backend table for tenants
pub const TENANTS_TABLE: &str = "tenants_pos_v1";

/// Subscription plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenantPlan {
    Basic,
    Pro,
    Enterprise,
}

impl Default for TenantPlan {
    fn default() -> Self {
        TenantPlan::Basic
    }
}

/// Tenant entity — one restaurant business account, the top-level
/// isolation boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub plan: TenantPlan,
    #[serde(default)]
    pub settings: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create tenant payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantCreate {
    pub name: String,
    pub plan: Option<TenantPlan>,
    pub settings: Option<serde_json::Value>,
}

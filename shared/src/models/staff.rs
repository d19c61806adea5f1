//! Staff Model

use serde::{Deserialize, Serialize};

/// Backend table for staff
pub const STAFF_TABLE: &str = "staff_pos_v1";

/// Staff role
///
/// Ordered from widest to narrowest authority. A staff row is unique per
/// (tenant_id, user_id) — enforced by the backend, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaffRole {
    Superadmin,
    Admin,
    Manager,
    Waiter,
    Chef,
}

impl StaffRole {
    /// Whether this role may manage other staff rows
    pub fn can_manage_staff(&self) -> bool {
        matches!(self, StaffRole::Superadmin | StaffRole::Admin | StaffRole::Manager)
    }
}

impl std::fmt::Display for StaffRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StaffRole::Superadmin => write!(f, "superadmin"),
            StaffRole::Admin => write!(f, "admin"),
            StaffRole::Manager => write!(f, "manager"),
            StaffRole::Waiter => write!(f, "waiter"),
            StaffRole::Chef => write!(f, "chef"),
        }
    }
}

/// Staff entity — links an auth identity to a tenant with a role and
/// capability tags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Staff {
    pub id: String,
    pub tenant_id: String,
    /// External auth identity
    pub user_id: String,
    pub email: String,
    pub role: StaffRole,
    #[serde(default)]
    pub permissions: Vec<String>,
    pub is_active: bool,
}

/// Create staff payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffCreate {
    pub tenant_id: String,
    pub user_id: String,
    pub email: String,
    pub role: StaffRole,
    pub permissions: Vec<String>,
    pub is_active: bool,
}

/// Update staff payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaffUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<StaffRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Staff row joined with its tenant, as returned when loading a user's
/// tenant associations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffTenant {
    pub tenant_id: String,
    pub role: StaffRole,
    #[serde(default)]
    pub permissions: Vec<String>,
    pub tenant: super::Tenant,
}

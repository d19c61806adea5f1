//! Location Model

use serde::{Deserialize, Serialize};

/// Backend table for locations
pub const LOCATIONS_TABLE: &str = "locations_pos_v1";

/// Location entity — a physical restaurant site belonging to a tenant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    /// Free-form address object ({street, city, state, zip})
    #[serde(default)]
    pub address: serde_json::Value,
}

/// Create location payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationCreate {
    pub tenant_id: String,
    pub name: String,
    pub address: Option<serde_json::Value>,
}

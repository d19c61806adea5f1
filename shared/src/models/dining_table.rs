//! Dining Table Model

use serde::{Deserialize, Serialize};

/// Backend table for dining tables
pub const TABLES_TABLE: &str = "tables_pos_v1";

/// Table availability status
///
/// Lifecycle: `Ready → Occupied` (seating / order creation) → `Ready`
/// (manual clear). `Reserved` is set only by explicit staff action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableStatus {
    Ready,
    Occupied,
    Reserved,
}

impl TableStatus {
    /// Whether a party can be seated at a table in this status
    pub fn is_seatable(&self) -> bool {
        matches!(self, TableStatus::Ready | TableStatus::Reserved)
    }
}

impl std::fmt::Display for TableStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableStatus::Ready => write!(f, "ready"),
            TableStatus::Occupied => write!(f, "occupied"),
            TableStatus::Reserved => write!(f, "reserved"),
        }
    }
}

/// Dining table entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTable {
    pub id: String,
    pub location_id: String,
    pub name: String,
    pub capacity: i32,
    pub status: TableStatus,
    /// Created on the fly (pop-up seating) rather than pre-provisioned
    #[serde(default)]
    pub is_ad_hoc: bool,
}

/// Create dining table payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTableCreate {
    pub location_id: String,
    pub name: String,
    pub capacity: i32,
    pub status: TableStatus,
    pub is_ad_hoc: bool,
}

/// Update dining table payload
///
/// Unset fields are omitted from the wire so a partial update never nulls
/// a column.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiningTableUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TableStatus>,
}

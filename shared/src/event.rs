//! Change-feed event types
//!
//! 这些类型在远程变更通道和内存数据源的本地回显之间共享，
//! 订阅方对两者一视同仁。

use serde::{Deserialize, Serialize};

/// Kind of change delivered on the feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    Created,
    Updated,
    Deleted,
}

impl std::fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeAction::Created => write!(f, "created"),
            ChangeAction::Updated => write!(f, "updated"),
            ChangeAction::Deleted => write!(f, "deleted"),
        }
    }
}

/// A single resource change, scoped to a location
///
/// `resource` is the backend table name (e.g. "tables_pos_v1"); `data` is the
/// changed row when the backend includes it (None on deletes).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub resource: String,
    pub action: ChangeAction,
    pub id: String,
    pub location_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ChangeEvent {
    /// Create a change event without row data
    pub fn new(
        resource: impl Into<String>,
        action: ChangeAction,
        id: impl Into<String>,
        location_id: impl Into<String>,
    ) -> Self {
        Self {
            resource: resource.into(),
            action,
            id: id.into(),
            location_id: location_id.into(),
            data: None,
        }
    }

    /// Attach the changed row
    pub fn with_data<T: Serialize>(mut self, data: &T) -> Self {
        self.data = serde_json::to_value(data).ok();
        self
    }

    /// Whether this event concerns the given resource
    pub fn is_for(&self, resource: &str) -> bool {
        self.resource == resource
    }
}

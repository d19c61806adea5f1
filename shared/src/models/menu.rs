//! Menu Catalog Models

use serde::{Deserialize, Serialize};

/// Backend table for menu categories
pub const MENU_CATEGORIES_TABLE: &str = "menu_categories_pos_v1";
/// Backend table for menu items
pub const MENU_ITEMS_TABLE: &str = "menu_items_pos_v1";

/// Menu category entity (tenant-scoped)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuCategory {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub sort_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Variant of a menu item with a price adjustment
/// (e.g. "Large" +3.00)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuVariant {
    pub name: String,
    pub price_adjustment: f64,
}

/// Menu item entity (tenant-scoped)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub tenant_id: String,
    pub category_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub base_price: f64,
    #[serde(default)]
    pub variants: Vec<MenuVariant>,
    #[serde(default = "default_true")]
    pub is_available: bool,
}

/// Create menu item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItemCreate {
    pub tenant_id: String,
    pub category_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub base_price: f64,
    pub variants: Option<Vec<MenuVariant>>,
}

/// Update menu item payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuItemUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variants: Option<Vec<MenuVariant>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_available: Option<bool>,
}

fn default_true() -> bool {
    true
}

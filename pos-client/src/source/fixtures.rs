//! Seeded demo data for the in-memory source
//!
//! Fixed records used whenever the client runs without a live backend.
//! Demo data is location-agnostic: one synthetic tenant/location owns
//! everything.

use chrono::{TimeZone, Utc};

use shared::models::*;

/// Synthetic tenant id used by demo fixtures
pub const DEMO_TENANT_ID: &str = "demo-tenant";
/// Synthetic location id used by demo fixtures
pub const DEMO_LOCATION_ID: &str = "demo-location";

/// The fixed demo floor: five tables and three bar seats
pub fn demo_tables() -> Vec<DiningTable> {
    let table = |id: &str, name: &str, capacity: i32, status: TableStatus| DiningTable {
        id: id.to_string(),
        location_id: DEMO_LOCATION_ID.to_string(),
        name: name.to_string(),
        capacity,
        status,
        is_ad_hoc: false,
    };

    vec![
        table("table-1", "Table 1", 4, TableStatus::Ready),
        table("table-2", "Table 2", 2, TableStatus::Occupied),
        table("table-3", "Table 3", 6, TableStatus::Ready),
        table("table-4", "Table 4", 4, TableStatus::Reserved),
        table("table-5", "Table 5", 2, TableStatus::Ready),
        table("bar-1", "Bar Seat 1", 1, TableStatus::Ready),
        table("bar-2", "Bar Seat 2", 1, TableStatus::Ready),
        table("bar-3", "Bar Seat 3", 1, TableStatus::Occupied),
    ]
}

/// The fixed demo menu
pub fn demo_menu_items() -> Vec<MenuItem> {
    let item = |id: &str, name: &str, price: f64, desc: &str, cat: &str| MenuItem {
        id: id.to_string(),
        tenant_id: DEMO_TENANT_ID.to_string(),
        category_id: Some(cat.to_string()),
        name: name.to_string(),
        description: desc.to_string(),
        base_price: price,
        variants: Vec::new(),
        is_available: true,
    };

    vec![
        item("item-1", "Burger Deluxe", 14.99, "Premium beef burger with all the fixings", "cat-1"),
        item("item-2", "Caesar Salad", 12.99, "Fresh romaine with caesar dressing", "cat-1"),
        item("item-3", "Fish & Chips", 16.99, "Beer battered fish with crispy fries", "cat-1"),
        item("item-4", "Pasta Carbonara", 15.99, "Creamy pasta with bacon and parmesan", "cat-1"),
        item("item-5", "Chicken Wings", 13.99, "10 piece wings with your choice of sauce", "cat-1"),
        item("item-6", "French Fries", 5.99, "Crispy golden fries", "cat-1"),
        item("item-7", "Coca Cola", 2.99, "Classic soft drink", "cat-2"),
        item("item-8", "Coffee", 3.99, "Freshly brewed coffee", "cat-2"),
    ]
}

/// The fixed demo categories
pub fn demo_categories() -> Vec<MenuCategory> {
    vec![
        MenuCategory {
            id: "cat-1".to_string(),
            tenant_id: DEMO_TENANT_ID.to_string(),
            name: "Food".to_string(),
            sort_order: 1,
            is_active: true,
        },
        MenuCategory {
            id: "cat-2".to_string(),
            tenant_id: DEMO_TENANT_ID.to_string(),
            name: "Drinks".to_string(),
            sort_order: 2,
            is_active: true,
        },
    ]
}

/// The fixed demo staff roster
pub fn demo_staff() -> Vec<Staff> {
    let member = |id: &str, email: &str, role: StaffRole, permissions: &[&str]| Staff {
        id: id.to_string(),
        tenant_id: DEMO_TENANT_ID.to_string(),
        user_id: format!("user-{id}"),
        email: email.to_string(),
        role,
        permissions: permissions.iter().map(|p| p.to_string()).collect(),
        is_active: true,
    };

    vec![
        member("staff-1", "admin@restaurant.com", StaffRole::Admin, &["full_access"]),
        member(
            "staff-2",
            "manager@restaurant.com",
            StaffRole::Manager,
            &["manage_staff", "view_reports", "pos_access"],
        ),
        member("staff-3", "waiter1@restaurant.com", StaffRole::Waiter, &["basic_pos"]),
        member(
            "staff-4",
            "chef@restaurant.com",
            StaffRole::Chef,
            &["kitchen_access", "inventory_manage"],
        ),
    ]
}

/// The fixed demo customer book
pub fn demo_customers() -> Vec<Customer> {
    let customer =
        |id: &str, name: &str, email: &str, phone: &str, visits: i32, spent: f64| Customer {
            id: id.to_string(),
            tenant_id: DEMO_TENANT_ID.to_string(),
            name: name.to_string(),
            email: Some(email.to_string()),
            phone: Some(phone.to_string()),
            visit_count: visits,
            total_spent: spent,
            last_visit: Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).single(),
        };

    vec![
        customer("customer-1", "John Doe", "john@example.com", "(555) 123-4567", 15, 487.50),
        customer("customer-2", "Sarah Johnson", "sarah@example.com", "(555) 987-6543", 8, 324.80),
        customer("customer-3", "Mike Chen", "mike@example.com", "(555) 456-7890", 25, 892.30),
    ]
}

/// A short demo payment history
pub fn demo_payments() -> Vec<Payment> {
    let payment = |id: &str, order_id: &str, amount: f64, method: PaymentMethod, status: PaymentStatus, hour: u32| Payment {
        id: id.to_string(),
        order_id: order_id.to_string(),
        location_id: DEMO_LOCATION_ID.to_string(),
        amount,
        tip: 0.0,
        method,
        status,
        created_at: Utc
            .with_ymd_and_hms(2024, 1, 15, hour, 0, 0)
            .single()
            .unwrap_or_else(Utc::now),
    };

    vec![
        payment("payment-1", "order-123", 47.85, PaymentMethod::Card, PaymentStatus::Pending, 14),
        payment("payment-2", "order-124", 23.50, PaymentMethod::Cash, PaymentStatus::Completed, 13),
        payment("payment-3", "order-125", 15.99, PaymentMethod::Digital, PaymentStatus::Failed, 12),
        payment("payment-4", "order-126", 89.45, PaymentMethod::Card, PaymentStatus::Completed, 11),
    ]
}

/// Starter financial categories for the demo tenant
pub fn demo_financial_categories() -> Vec<FinancialCategory> {
    let category = |id: &str, name: &str, kind: FinanceKind, color: &str| FinancialCategory {
        id: id.to_string(),
        scope: FinanceScope::Business,
        tenant_id: Some(DEMO_TENANT_ID.to_string()),
        user_id: None,
        name: name.to_string(),
        kind,
        color: color.to_string(),
        icon: "FiDollarSign".to_string(),
        is_active: true,
    };

    vec![
        category("fincat-1", "Sales", FinanceKind::Income, "#22c55e"),
        category("fincat-2", "Ingredients", FinanceKind::Expense, "#ef4444"),
        category("fincat-3", "Rent", FinanceKind::Expense, "#3b82f6"),
    ]
}

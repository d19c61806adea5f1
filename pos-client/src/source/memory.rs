//! In-memory data source
//!
//! Backs demo/offline sessions. Seeded from [`super::fixtures`]; all state
//! is transient and discarded with the process. Mutations emit
//! [`ChangeEvent`]s on a local broadcast channel so the realtime contract
//! holds without a backend.
//!
//! Demo data is location/tenant-agnostic: list operations ignore the owner
//! argument, matching the fixed demo records a live session would never see.

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::broadcast;
use uuid::Uuid;

use async_trait::async_trait;

use shared::error::{PosError, PosResult};
use shared::event::{ChangeAction, ChangeEvent};
use shared::models::*;

use super::{DataSource, fixtures};
use crate::money;

const EVENT_CAPACITY: usize = 64;

/// In-memory implementation of [`DataSource`]
pub struct MemorySource {
    tables: DashMap<String, DiningTable>,
    menu_items: DashMap<String, MenuItem>,
    categories: DashMap<String, MenuCategory>,
    orders: DashMap<String, Order>,
    payments: DashMap<String, Payment>,
    tenants: DashMap<String, Tenant>,
    locations: DashMap<String, Location>,
    staff: DashMap<String, Staff>,
    customers: DashMap<String, Customer>,
    financial_categories: DashMap<String, FinancialCategory>,
    transactions: DashMap<String, FinancialTransaction>,
    events: broadcast::Sender<ChangeEvent>,
}

impl MemorySource {
    /// Create an empty source (no seeded records)
    pub fn empty() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            tables: DashMap::new(),
            menu_items: DashMap::new(),
            categories: DashMap::new(),
            orders: DashMap::new(),
            payments: DashMap::new(),
            tenants: DashMap::new(),
            locations: DashMap::new(),
            staff: DashMap::new(),
            customers: DashMap::new(),
            financial_categories: DashMap::new(),
            transactions: DashMap::new(),
            events,
        }
    }

    /// Create a source seeded with the fixed demo records
    pub fn with_fixtures() -> Self {
        let source = Self::empty();
        for table in fixtures::demo_tables() {
            source.tables.insert(table.id.clone(), table);
        }
        for item in fixtures::demo_menu_items() {
            source.menu_items.insert(item.id.clone(), item);
        }
        for category in fixtures::demo_categories() {
            source.categories.insert(category.id.clone(), category);
        }
        for member in fixtures::demo_staff() {
            source.staff.insert(member.id.clone(), member);
        }
        for customer in fixtures::demo_customers() {
            source.customers.insert(customer.id.clone(), customer);
        }
        for payment in fixtures::demo_payments() {
            source.payments.insert(payment.id.clone(), payment);
        }
        for category in fixtures::demo_financial_categories() {
            source
                .financial_categories
                .insert(category.id.clone(), category);
        }
        source
    }

    fn emit(&self, event: ChangeEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn new_id(prefix: &str) -> String {
        format!("{prefix}-{}", Uuid::new_v4())
    }
}

#[async_trait]
impl DataSource for MemorySource {
    fn describe(&self) -> &'static str {
        "memory"
    }

    // ===== Tables =====

    async fn list_tables(&self, _location_id: &str) -> PosResult<Vec<DiningTable>> {
        let mut tables: Vec<DiningTable> =
            self.tables.iter().map(|entry| entry.value().clone()).collect();
        tables.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tables)
    }

    async fn create_table(&self, payload: DiningTableCreate) -> PosResult<DiningTable> {
        let table = DiningTable {
            id: Self::new_id("table"),
            location_id: payload.location_id,
            name: payload.name,
            capacity: payload.capacity,
            status: payload.status,
            is_ad_hoc: payload.is_ad_hoc,
        };
        self.tables.insert(table.id.clone(), table.clone());
        self.emit(
            ChangeEvent::new(TABLES_TABLE, ChangeAction::Created, &table.id, &table.location_id)
                .with_data(&table),
        );
        Ok(table)
    }

    async fn update_table(
        &self,
        table_id: &str,
        update: DiningTableUpdate,
    ) -> PosResult<DiningTable> {
        let mut entry = self
            .tables
            .get_mut(table_id)
            .ok_or_else(|| PosError::not_found(format!("Table {table_id}")))?;

        if let Some(name) = update.name {
            entry.name = name;
        }
        if let Some(capacity) = update.capacity {
            entry.capacity = capacity;
        }
        if let Some(status) = update.status {
            entry.status = status;
        }

        let table = entry.value().clone();
        drop(entry);
        self.emit(
            ChangeEvent::new(TABLES_TABLE, ChangeAction::Updated, &table.id, &table.location_id)
                .with_data(&table),
        );
        Ok(table)
    }

    // ===== Menu catalog =====

    async fn list_menu_items(&self, _tenant_id: &str) -> PosResult<Vec<MenuItem>> {
        let mut items: Vec<MenuItem> = self
            .menu_items
            .iter()
            .filter(|entry| entry.is_available)
            .map(|entry| entry.value().clone())
            .collect();
        items.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(items)
    }

    async fn list_menu_categories(&self, _tenant_id: &str) -> PosResult<Vec<MenuCategory>> {
        let mut categories: Vec<MenuCategory> = self
            .categories
            .iter()
            .filter(|entry| entry.is_active)
            .map(|entry| entry.value().clone())
            .collect();
        categories.sort_by_key(|c| c.sort_order);
        Ok(categories)
    }

    // ===== Orders =====

    async fn create_order(&self, payload: OrderCreate) -> PosResult<Order> {
        let order = Order {
            id: Self::new_id("order"),
            location_id: payload.location_id,
            table_id: payload.table_id,
            staff_id: payload.staff_id,
            order_type: payload.order_type,
            status: OrderStatus::Pending,
            subtotal: 0.0,
            tax: 0.0,
            tip: 0.0,
            total: 0.0,
            split_from: None,
            items: Vec::new(),
            created_at: Utc::now(),
        };
        self.orders.insert(order.id.clone(), order.clone());
        self.emit(
            ChangeEvent::new(ORDERS_TABLE, ChangeAction::Created, &order.id, &order.location_id)
                .with_data(&order),
        );
        Ok(order)
    }

    async fn add_order_item(&self, payload: OrderItemCreate) -> PosResult<Order> {
        let unit_price = self
            .menu_items
            .get(&payload.menu_item_id)
            .map(|item| item.base_price)
            .ok_or_else(|| PosError::not_found(format!("Menu item {}", payload.menu_item_id)))?;

        let mut entry = self
            .orders
            .get_mut(&payload.order_id)
            .ok_or_else(|| PosError::not_found(format!("Order {}", payload.order_id)))?;

        entry.items.push(OrderItem {
            id: Self::new_id("order-item"),
            order_id: payload.order_id.clone(),
            menu_item_id: payload.menu_item_id,
            quantity: payload.quantity,
            unit_price,
            modifiers: payload.modifiers,
            status: OrderItemStatus::Pending,
        });
        money::recalculate_order(&mut entry);

        let order = entry.value().clone();
        drop(entry);
        self.emit(
            ChangeEvent::new(ORDERS_TABLE, ChangeAction::Updated, &order.id, &order.location_id)
                .with_data(&order),
        );
        Ok(order)
    }

    async fn split_order(
        &self,
        order_id: &str,
        item_ids: &[String],
        target_table_id: &str,
    ) -> PosResult<Order> {
        let mut parent = self
            .orders
            .get_mut(order_id)
            .ok_or_else(|| PosError::not_found(format!("Order {order_id}")))?;

        let (moved, kept): (Vec<OrderItem>, Vec<OrderItem>) = parent
            .items
            .drain(..)
            .partition(|item| item_ids.contains(&item.id));

        if moved.is_empty() {
            parent.items = kept;
            return Err(PosError::validation("No matching items to split"));
        }

        parent.items = kept;
        money::recalculate_order(&mut parent);
        let parent_snapshot = parent.value().clone();

        let split_id = Self::new_id("order");
        let mut split = Order {
            id: split_id.clone(),
            location_id: parent.location_id.clone(),
            table_id: Some(target_table_id.to_string()),
            staff_id: parent.staff_id.clone(),
            order_type: parent.order_type,
            status: OrderStatus::Pending,
            subtotal: 0.0,
            tax: 0.0,
            tip: 0.0,
            total: 0.0,
            split_from: Some(parent.id.clone()),
            items: moved
                .into_iter()
                .map(|mut item| {
                    item.order_id = split_id.clone();
                    item
                })
                .collect(),
            created_at: Utc::now(),
        };
        drop(parent);

        money::recalculate_order(&mut split);
        self.orders.insert(split.id.clone(), split.clone());

        // The split bill seats its target table
        if let Some(mut table) = self.tables.get_mut(target_table_id) {
            table.status = TableStatus::Occupied;
            let table_snapshot = table.value().clone();
            drop(table);
            self.emit(
                ChangeEvent::new(
                    TABLES_TABLE,
                    ChangeAction::Updated,
                    target_table_id,
                    &table_snapshot.location_id,
                )
                .with_data(&table_snapshot),
            );
        }

        self.emit(
            ChangeEvent::new(
                ORDERS_TABLE,
                ChangeAction::Updated,
                &parent_snapshot.id,
                &parent_snapshot.location_id,
            )
            .with_data(&parent_snapshot),
        );
        self.emit(
            ChangeEvent::new(ORDERS_TABLE, ChangeAction::Created, &split.id, &split.location_id)
                .with_data(&split),
        );
        Ok(split)
    }

    async fn list_active_orders(&self, _location_id: &str) -> PosResult<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|entry| entry.status.is_open())
            .map(|entry| entry.value().clone())
            .collect();
        orders.sort_by_key(|o| o.created_at);
        Ok(orders)
    }

    async fn update_order_item_status(
        &self,
        order_id: &str,
        item_id: &str,
        status: OrderItemStatus,
    ) -> PosResult<()> {
        let mut entry = self
            .orders
            .get_mut(order_id)
            .ok_or_else(|| PosError::not_found(format!("Order {order_id}")))?;

        let item = entry
            .items
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or_else(|| PosError::not_found(format!("Order item {item_id}")))?;
        item.status = status;

        let order = entry.value().clone();
        drop(entry);
        self.emit(
            ChangeEvent::new(ORDERS_TABLE, ChangeAction::Updated, &order.id, &order.location_id)
                .with_data(&order),
        );
        Ok(())
    }

    // ===== Payments =====

    async fn record_payment(&self, payload: PaymentCreate) -> PosResult<Payment> {
        let mut order = self
            .orders
            .get_mut(&payload.order_id)
            .ok_or_else(|| PosError::not_found(format!("Order {}", payload.order_id)))?;

        order.tip = payload.tip;
        order.status = OrderStatus::Completed;
        money::recalculate_order(&mut order);
        let order_snapshot = order.value().clone();
        drop(order);

        let payment = Payment {
            id: Self::new_id("payment"),
            order_id: payload.order_id,
            location_id: order_snapshot.location_id.clone(),
            amount: payload.amount,
            tip: payload.tip,
            method: payload.method,
            status: PaymentStatus::Completed,
            created_at: Utc::now(),
        };
        self.payments.insert(payment.id.clone(), payment.clone());

        // Settling the bill frees the table
        if let Some(table_id) = &order_snapshot.table_id {
            if let Some(mut table) = self.tables.get_mut(table_id) {
                table.status = TableStatus::Ready;
                let table_snapshot = table.value().clone();
                drop(table);
                self.emit(
                    ChangeEvent::new(
                        TABLES_TABLE,
                        ChangeAction::Updated,
                        table_id,
                        &table_snapshot.location_id,
                    )
                    .with_data(&table_snapshot),
                );
            }
        }

        self.emit(
            ChangeEvent::new(
                ORDERS_TABLE,
                ChangeAction::Updated,
                &order_snapshot.id,
                &order_snapshot.location_id,
            )
            .with_data(&order_snapshot),
        );
        self.emit(
            ChangeEvent::new(
                PAYMENTS_TABLE,
                ChangeAction::Created,
                &payment.id,
                &payment.location_id,
            )
            .with_data(&payment),
        );
        Ok(payment)
    }

    async fn list_payments(&self, _location_id: &str) -> PosResult<Vec<Payment>> {
        let mut payments: Vec<Payment> =
            self.payments.iter().map(|entry| entry.value().clone()).collect();
        payments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(payments)
    }

    // ===== Tenancy =====

    async fn create_tenant(&self, payload: TenantCreate) -> PosResult<Tenant> {
        let now = Utc::now();
        let tenant = Tenant {
            id: Self::new_id("tenant"),
            name: payload.name,
            plan: payload.plan.unwrap_or_default(),
            settings: payload.settings.unwrap_or_else(|| serde_json::json!({})),
            created_at: now,
            updated_at: now,
        };
        self.tenants.insert(tenant.id.clone(), tenant.clone());
        Ok(tenant)
    }

    async fn list_locations(&self, tenant_id: &str) -> PosResult<Vec<Location>> {
        let mut locations: Vec<Location> = self
            .locations
            .iter()
            .filter(|entry| entry.tenant_id == tenant_id)
            .map(|entry| entry.value().clone())
            .collect();
        locations.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(locations)
    }

    async fn create_location(&self, payload: LocationCreate) -> PosResult<Location> {
        let location = Location {
            id: Self::new_id("location"),
            tenant_id: payload.tenant_id,
            name: payload.name,
            address: payload.address.unwrap_or_else(|| serde_json::json!({})),
        };
        self.locations.insert(location.id.clone(), location.clone());
        Ok(location)
    }

    async fn list_staff_tenants(&self, user_id: &str) -> PosResult<Vec<StaffTenant>> {
        let memberships = self
            .staff
            .iter()
            .filter(|entry| entry.user_id == user_id && entry.is_active)
            .filter_map(|entry| {
                self.tenants.get(&entry.tenant_id).map(|tenant| StaffTenant {
                    tenant_id: entry.tenant_id.clone(),
                    role: entry.role,
                    permissions: entry.permissions.clone(),
                    tenant: tenant.value().clone(),
                })
            })
            .collect();
        Ok(memberships)
    }

    // ===== Staff & customers =====

    async fn list_staff(&self, _tenant_id: &str) -> PosResult<Vec<Staff>> {
        let mut staff: Vec<Staff> = self.staff.iter().map(|entry| entry.value().clone()).collect();
        staff.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(staff)
    }

    async fn create_staff(&self, payload: StaffCreate) -> PosResult<Staff> {
        let duplicate = self
            .staff
            .iter()
            .any(|entry| entry.tenant_id == payload.tenant_id && entry.user_id == payload.user_id);
        if duplicate {
            return Err(PosError::conflict(format!("Staff {}", payload.email)));
        }

        let member = Staff {
            id: Self::new_id("staff"),
            tenant_id: payload.tenant_id,
            user_id: payload.user_id,
            email: payload.email,
            role: payload.role,
            permissions: payload.permissions,
            is_active: payload.is_active,
        };
        self.staff.insert(member.id.clone(), member.clone());
        Ok(member)
    }

    async fn update_staff(&self, staff_id: &str, update: StaffUpdate) -> PosResult<Staff> {
        let mut entry = self
            .staff
            .get_mut(staff_id)
            .ok_or_else(|| PosError::not_found(format!("Staff {staff_id}")))?;

        if let Some(role) = update.role {
            entry.role = role;
        }
        if let Some(permissions) = update.permissions {
            entry.permissions = permissions;
        }
        if let Some(is_active) = update.is_active {
            entry.is_active = is_active;
        }
        Ok(entry.value().clone())
    }

    async fn list_customers(&self, _tenant_id: &str) -> PosResult<Vec<Customer>> {
        let mut customers: Vec<Customer> =
            self.customers.iter().map(|entry| entry.value().clone()).collect();
        customers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(customers)
    }

    async fn create_customer(&self, payload: CustomerCreate) -> PosResult<Customer> {
        let customer = Customer {
            id: Self::new_id("customer"),
            tenant_id: payload.tenant_id,
            name: payload.name,
            email: payload.email,
            phone: payload.phone,
            visit_count: 0,
            total_spent: 0.0,
            last_visit: None,
        };
        self.customers.insert(customer.id.clone(), customer.clone());
        Ok(customer)
    }

    async fn update_customer(
        &self,
        customer_id: &str,
        update: CustomerUpdate,
    ) -> PosResult<Customer> {
        let mut entry = self
            .customers
            .get_mut(customer_id)
            .ok_or_else(|| PosError::not_found(format!("Customer {customer_id}")))?;

        if let Some(name) = update.name {
            entry.name = name;
        }
        if let Some(email) = update.email {
            entry.email = Some(email);
        }
        if let Some(phone) = update.phone {
            entry.phone = Some(phone);
        }
        Ok(entry.value().clone())
    }

    async fn delete_customer(&self, customer_id: &str) -> PosResult<()> {
        self.customers
            .remove(customer_id)
            .map(|_| ())
            .ok_or_else(|| PosError::not_found(format!("Customer {customer_id}")))
    }

    // ===== Finance =====

    async fn list_financial_categories(
        &self,
        scope: FinanceScope,
        _owner_id: &str,
    ) -> PosResult<Vec<FinancialCategory>> {
        let mut categories: Vec<FinancialCategory> = self
            .financial_categories
            .iter()
            .filter(|entry| entry.scope == scope && entry.is_active)
            .map(|entry| entry.value().clone())
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn create_financial_category(
        &self,
        payload: FinancialCategoryCreate,
    ) -> PosResult<FinancialCategory> {
        let category = FinancialCategory {
            id: Self::new_id("fincat"),
            scope: payload.scope,
            tenant_id: payload.tenant_id,
            user_id: payload.user_id,
            name: payload.name,
            kind: payload.kind,
            color: payload.color.unwrap_or_else(|| "#3b82f6".to_string()),
            icon: payload.icon.unwrap_or_else(|| "FiDollarSign".to_string()),
            is_active: true,
        };
        self.financial_categories
            .insert(category.id.clone(), category.clone());
        Ok(category)
    }

    async fn list_transactions(
        &self,
        scope: FinanceScope,
        _owner_id: &str,
    ) -> PosResult<Vec<FinancialTransaction>> {
        let mut transactions: Vec<FinancialTransaction> = self
            .transactions
            .iter()
            .filter(|entry| entry.scope == scope)
            .map(|entry| entry.value().clone())
            .collect();
        transactions.sort_by(|a, b| b.transaction_date.cmp(&a.transaction_date));
        Ok(transactions)
    }

    async fn create_transaction(
        &self,
        payload: FinancialTransactionCreate,
    ) -> PosResult<FinancialTransaction> {
        let transaction = FinancialTransaction {
            id: Self::new_id("txn"),
            scope: payload.scope,
            tenant_id: payload.tenant_id,
            user_id: payload.user_id,
            category_id: payload.category_id,
            title: payload.title,
            description: payload.description.unwrap_or_default(),
            amount: payload.amount,
            kind: payload.kind,
            payment_method: payload.payment_method,
            transaction_date: payload.transaction_date,
            reference_number: payload.reference_number,
            tags: payload.tags,
            created_at: Utc::now(),
        };
        self.transactions
            .insert(transaction.id.clone(), transaction.clone());
        Ok(transaction)
    }

    async fn update_transaction(
        &self,
        transaction_id: &str,
        update: FinancialTransactionUpdate,
    ) -> PosResult<FinancialTransaction> {
        let mut entry = self
            .transactions
            .get_mut(transaction_id)
            .ok_or_else(|| PosError::not_found(format!("Transaction {transaction_id}")))?;

        if let Some(category_id) = update.category_id {
            entry.category_id = Some(category_id);
        }
        if let Some(title) = update.title {
            entry.title = title;
        }
        if let Some(description) = update.description {
            entry.description = description;
        }
        if let Some(amount) = update.amount {
            entry.amount = amount;
        }
        if let Some(kind) = update.kind {
            entry.kind = kind;
        }
        if let Some(payment_method) = update.payment_method {
            entry.payment_method = payment_method;
        }
        if let Some(transaction_date) = update.transaction_date {
            entry.transaction_date = transaction_date;
        }
        if let Some(reference_number) = update.reference_number {
            entry.reference_number = Some(reference_number);
        }
        if let Some(tags) = update.tags {
            entry.tags = tags;
        }
        Ok(entry.value().clone())
    }

    async fn delete_transaction(&self, transaction_id: &str) -> PosResult<()> {
        self.transactions
            .remove(transaction_id)
            .map(|_| ())
            .ok_or_else(|| PosError::not_found(format!("Transaction {transaction_id}")))
    }

    // ===== Change feed =====

    fn subscribe(&self, _location_id: &str) -> broadcast::Receiver<ChangeEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixtures_seed_the_demo_floor() {
        let source = MemorySource::with_fixtures();
        let tables = source.list_tables("anywhere").await.unwrap();
        assert_eq!(tables.len(), 8);

        let items = source.list_menu_items("any-tenant").await.unwrap();
        assert_eq!(items.len(), 8);

        let categories = source.list_menu_categories("any-tenant").await.unwrap();
        assert_eq!(categories.len(), 2);
    }

    #[tokio::test]
    async fn add_order_item_accumulates_subtotal() {
        let source = MemorySource::with_fixtures();
        let order = source
            .create_order(OrderCreate {
                location_id: "loc-1".to_string(),
                table_id: Some("table-1".to_string()),
                staff_id: None,
                order_type: OrderType::DineIn,
            })
            .await
            .unwrap();

        let order = source
            .add_order_item(OrderItemCreate {
                order_id: order.id.clone(),
                menu_item_id: "item-1".to_string(), // Burger Deluxe 14.99
                quantity: 2,
                modifiers: Vec::new(),
            })
            .await
            .unwrap();
        assert_eq!(order.subtotal, 29.98);

        let order = source
            .add_order_item(OrderItemCreate {
                order_id: order.id.clone(),
                menu_item_id: "item-7".to_string(), // Coca Cola 2.99
                quantity: 1,
                modifiers: Vec::new(),
            })
            .await
            .unwrap();
        assert_eq!(order.subtotal, 32.97);
        assert_eq!(order.total, 32.97);
    }

    #[tokio::test]
    async fn unknown_menu_item_is_rejected() {
        let source = MemorySource::with_fixtures();
        let order = source
            .create_order(OrderCreate {
                location_id: "loc-1".to_string(),
                table_id: None,
                staff_id: None,
                order_type: OrderType::DineIn,
            })
            .await
            .unwrap();

        let err = source
            .add_order_item(OrderItemCreate {
                order_id: order.id,
                menu_item_id: "item-999".to_string(),
                quantity: 1,
                modifiers: Vec::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PosError::NotFound { .. }));
    }

    #[tokio::test]
    async fn split_moves_exactly_the_chosen_items() {
        let source = MemorySource::with_fixtures();
        let order = source
            .create_order(OrderCreate {
                location_id: "loc-1".to_string(),
                table_id: Some("table-1".to_string()),
                staff_id: None,
                order_type: OrderType::DineIn,
            })
            .await
            .unwrap();

        let order = source
            .add_order_item(OrderItemCreate {
                order_id: order.id.clone(),
                menu_item_id: "item-1".to_string(),
                quantity: 1,
                modifiers: Vec::new(),
            })
            .await
            .unwrap();
        let order = source
            .add_order_item(OrderItemCreate {
                order_id: order.id.clone(),
                menu_item_id: "item-3".to_string(), // Fish & Chips 16.99
                quantity: 1,
                modifiers: Vec::new(),
            })
            .await
            .unwrap();

        let moved_id = order.items[1].id.clone();
        let split = source
            .split_order(&order.id, &[moved_id], "table-5")
            .await
            .unwrap();

        assert_eq!(split.split_from.as_deref(), Some(order.id.as_str()));
        assert_eq!(split.items.len(), 1);
        assert_eq!(split.subtotal, 16.99);
        assert_eq!(split.table_id.as_deref(), Some("table-5"));

        let parent = source.orders.get(&order.id).unwrap().value().clone();
        assert_eq!(parent.items.len(), 1);
        assert_eq!(parent.subtotal, 14.99);

        // target table got seated
        let tables = source.list_tables("loc-1").await.unwrap();
        let target = tables.iter().find(|t| t.id == "table-5").unwrap();
        assert_eq!(target.status, TableStatus::Occupied);
    }

    #[tokio::test]
    async fn split_with_no_matching_items_fails() {
        let source = MemorySource::with_fixtures();
        let order = source
            .create_order(OrderCreate {
                location_id: "loc-1".to_string(),
                table_id: None,
                staff_id: None,
                order_type: OrderType::DineIn,
            })
            .await
            .unwrap();

        let err = source
            .split_order(&order.id, &["nope".to_string()], "table-5")
            .await
            .unwrap_err();
        assert!(matches!(err, PosError::Validation { .. }));
    }

    #[tokio::test]
    async fn payment_completes_order_and_frees_table() {
        let source = MemorySource::with_fixtures();
        let order = source
            .create_order(OrderCreate {
                location_id: "loc-1".to_string(),
                table_id: Some("table-2".to_string()), // seeded occupied
                staff_id: None,
                order_type: OrderType::DineIn,
            })
            .await
            .unwrap();
        let order = source
            .add_order_item(OrderItemCreate {
                order_id: order.id.clone(),
                menu_item_id: "item-2".to_string(), // Caesar Salad 12.99
                quantity: 1,
                modifiers: Vec::new(),
            })
            .await
            .unwrap();

        let payment = source
            .record_payment(PaymentCreate {
                order_id: order.id.clone(),
                amount: 12.99,
                tip: 2.0,
                method: PaymentMethod::Card,
            })
            .await
            .unwrap();
        assert_eq!(payment.status, PaymentStatus::Completed);

        let settled = source.orders.get(&order.id).unwrap().value().clone();
        assert_eq!(settled.status, OrderStatus::Completed);
        assert_eq!(settled.total, 14.99); // 12.99 + 2.00 tip

        let tables = source.list_tables("loc-1").await.unwrap();
        let table = tables.iter().find(|t| t.id == "table-2").unwrap();
        assert_eq!(table.status, TableStatus::Ready);
    }

    #[tokio::test]
    async fn mutations_echo_on_the_change_feed() {
        let source = MemorySource::with_fixtures();
        let mut feed = source.subscribe("loc-1");

        source
            .update_table(
                "table-1",
                DiningTableUpdate {
                    status: Some(TableStatus::Occupied),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let event = feed.try_recv().unwrap();
        assert_eq!(event.resource, TABLES_TABLE);
        assert_eq!(event.action, ChangeAction::Updated);
        assert_eq!(event.id, "table-1");
    }

    #[tokio::test]
    async fn staff_unique_per_tenant_and_user() {
        let source = MemorySource::empty();
        let payload = StaffCreate {
            tenant_id: "t1".to_string(),
            user_id: "u1".to_string(),
            email: "a@b.c".to_string(),
            role: StaffRole::Waiter,
            permissions: vec!["basic_pos".to_string()],
            is_active: true,
        };
        source.create_staff(payload.clone()).await.unwrap();
        let err = source.create_staff(payload).await.unwrap_err();
        assert!(matches!(err, PosError::Conflict { .. }));
    }
}

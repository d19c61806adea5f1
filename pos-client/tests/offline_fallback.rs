//! Offline-fallback contract tests
//!
//! A session starts live against a backend that turns out to be
//! unreachable; load paths must substitute the seeded demo data and flip
//! the shared connection mode exactly once. Mutation paths never
//! substitute — they surface the failure.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;

use pos_client::source::{ConnectionMode, DataSource, SourceSwitch};
use pos_client::store::PosStore;
use shared::error::{PosError, PosResult};
use shared::event::ChangeEvent;
use shared::models::*;

/// A remote source whose backend never answers
struct UnreachableSource;

macro_rules! unreachable_backend {
    () => {
        Err(PosError::transport("connection refused"))
    };
}

#[async_trait]
impl DataSource for UnreachableSource {
    fn describe(&self) -> &'static str {
        "unreachable"
    }

    async fn list_tables(&self, _: &str) -> PosResult<Vec<DiningTable>> {
        unreachable_backend!()
    }
    async fn create_table(&self, _: DiningTableCreate) -> PosResult<DiningTable> {
        unreachable_backend!()
    }
    async fn update_table(&self, _: &str, _: DiningTableUpdate) -> PosResult<DiningTable> {
        unreachable_backend!()
    }
    async fn list_menu_items(&self, _: &str) -> PosResult<Vec<MenuItem>> {
        unreachable_backend!()
    }
    async fn list_menu_categories(&self, _: &str) -> PosResult<Vec<MenuCategory>> {
        unreachable_backend!()
    }
    async fn create_order(&self, _: OrderCreate) -> PosResult<Order> {
        unreachable_backend!()
    }
    async fn add_order_item(&self, _: OrderItemCreate) -> PosResult<Order> {
        unreachable_backend!()
    }
    async fn split_order(&self, _: &str, _: &[String], _: &str) -> PosResult<Order> {
        unreachable_backend!()
    }
    async fn list_active_orders(&self, _: &str) -> PosResult<Vec<Order>> {
        unreachable_backend!()
    }
    async fn update_order_item_status(
        &self,
        _: &str,
        _: &str,
        _: OrderItemStatus,
    ) -> PosResult<()> {
        unreachable_backend!()
    }
    async fn record_payment(&self, _: PaymentCreate) -> PosResult<Payment> {
        unreachable_backend!()
    }
    async fn list_payments(&self, _: &str) -> PosResult<Vec<Payment>> {
        unreachable_backend!()
    }
    async fn create_tenant(&self, _: TenantCreate) -> PosResult<Tenant> {
        unreachable_backend!()
    }
    async fn list_locations(&self, _: &str) -> PosResult<Vec<Location>> {
        unreachable_backend!()
    }
    async fn create_location(&self, _: LocationCreate) -> PosResult<Location> {
        unreachable_backend!()
    }
    async fn list_staff_tenants(&self, _: &str) -> PosResult<Vec<StaffTenant>> {
        unreachable_backend!()
    }
    async fn list_staff(&self, _: &str) -> PosResult<Vec<Staff>> {
        unreachable_backend!()
    }
    async fn create_staff(&self, _: StaffCreate) -> PosResult<Staff> {
        unreachable_backend!()
    }
    async fn update_staff(&self, _: &str, _: StaffUpdate) -> PosResult<Staff> {
        unreachable_backend!()
    }
    async fn list_customers(&self, _: &str) -> PosResult<Vec<Customer>> {
        unreachable_backend!()
    }
    async fn create_customer(&self, _: CustomerCreate) -> PosResult<Customer> {
        unreachable_backend!()
    }
    async fn update_customer(&self, _: &str, _: CustomerUpdate) -> PosResult<Customer> {
        unreachable_backend!()
    }
    async fn delete_customer(&self, _: &str) -> PosResult<()> {
        unreachable_backend!()
    }
    async fn list_financial_categories(
        &self,
        _: FinanceScope,
        _: &str,
    ) -> PosResult<Vec<FinancialCategory>> {
        unreachable_backend!()
    }
    async fn create_financial_category(
        &self,
        _: FinancialCategoryCreate,
    ) -> PosResult<FinancialCategory> {
        unreachable_backend!()
    }
    async fn list_transactions(
        &self,
        _: FinanceScope,
        _: &str,
    ) -> PosResult<Vec<FinancialTransaction>> {
        unreachable_backend!()
    }
    async fn create_transaction(
        &self,
        _: FinancialTransactionCreate,
    ) -> PosResult<FinancialTransaction> {
        unreachable_backend!()
    }
    async fn update_transaction(
        &self,
        _: &str,
        _: FinancialTransactionUpdate,
    ) -> PosResult<FinancialTransaction> {
        unreachable_backend!()
    }
    async fn delete_transaction(&self, _: &str) -> PosResult<()> {
        unreachable_backend!()
    }

    fn subscribe(&self, _: &str) -> broadcast::Receiver<ChangeEvent> {
        let (sender, receiver) = broadcast::channel(1);
        std::mem::forget(sender); // keep the channel open, it just never fires
        receiver
    }
}

fn live_but_unreachable() -> Arc<SourceSwitch> {
    SourceSwitch::live(Arc::new(UnreachableSource))
}

#[tokio::test]
async fn failed_table_load_substitutes_demo_floor() {
    let switch = live_but_unreachable();
    let store = PosStore::new(switch.clone());
    assert_eq!(switch.mode(), ConnectionMode::Live);

    let tables = store.load_tables("loc-1").await.unwrap();
    assert_eq!(tables.len(), 8);
    assert_eq!(switch.mode(), ConnectionMode::OfflineDemo);
    assert_eq!(store.state().await.tables.len(), 8);
}

#[tokio::test]
async fn failed_menu_load_substitutes_demo_catalog() {
    let switch = live_but_unreachable();
    let store = PosStore::new(switch.clone());

    let (items, categories) = store.load_menu("tenant-1").await.unwrap();
    assert_eq!(items.len(), 8);
    assert_eq!(categories.len(), 2);
    assert_eq!(switch.mode(), ConnectionMode::OfflineDemo);
}

#[tokio::test]
async fn offline_order_accumulates_subtotal_in_call_order() {
    let switch = live_but_unreachable();
    let store = PosStore::new(switch.clone());

    // degrade through the load path, as a real session would
    store.load_tables("loc-1").await.unwrap();
    store.load_menu("tenant-1").await.unwrap();

    let order = store
        .create_order("loc-1", "table-1", OrderType::DineIn)
        .await
        .unwrap();

    store
        .add_item_to_order(&order.id, "item-1", 2, Vec::new())
        .await
        .unwrap();
    let current = store.state().await.current_order.unwrap();
    assert_eq!(current.subtotal, 29.98); // 2 × 14.99

    store
        .add_item_to_order(&order.id, "item-8", 1, Vec::new())
        .await
        .unwrap();
    let current = store.state().await.current_order.unwrap();
    assert_eq!(current.subtotal, 33.97); // + 3.99
    assert_eq!(current.items.len(), 2);
}

#[tokio::test]
async fn update_table_status_touches_exactly_one_table() {
    let switch = live_but_unreachable();
    let store = PosStore::new(switch.clone());
    let before = store.load_tables("loc-1").await.unwrap();

    store
        .update_table_status("table-3", TableStatus::Occupied)
        .await
        .unwrap();

    let after = store.state().await.tables;
    for table in &after {
        let original = before.iter().find(|t| t.id == table.id).unwrap();
        if table.id == "table-3" {
            assert_eq!(table.status, TableStatus::Occupied);
        } else {
            assert_eq!(table.status, original.status, "table {} must be untouched", table.id);
        }
    }
}

#[tokio::test]
async fn ad_hoc_table_is_ready_and_flagged() {
    let switch = live_but_unreachable();
    let store = PosStore::new(switch.clone());
    store.load_tables("loc-1").await.unwrap();

    let table = store
        .create_ad_hoc_table("loc-1", "Patio Pop-up", 6)
        .await
        .unwrap();
    assert!(table.is_ad_hoc);
    assert_eq!(table.status, TableStatus::Ready);
    assert_eq!(table.capacity, 6);
    assert_eq!(store.state().await.tables.len(), 9);
}

#[tokio::test]
async fn creating_an_order_seats_the_table() {
    let switch = live_but_unreachable();
    let store = PosStore::new(switch.clone());
    store.load_tables("loc-1").await.unwrap();

    store
        .create_order("loc-1", "table-1", OrderType::DineIn)
        .await
        .unwrap();

    let state = store.state().await;
    let table = state.tables.iter().find(|t| t.id == "table-1").unwrap();
    assert_eq!(table.status, TableStatus::Occupied);
}

#[tokio::test]
async fn split_bill_updates_the_current_order() {
    let switch = live_but_unreachable();
    let store = PosStore::new(switch.clone());
    store.load_tables("loc-1").await.unwrap();
    store.load_menu("tenant-1").await.unwrap();

    let order = store
        .create_order("loc-1", "table-1", OrderType::DineIn)
        .await
        .unwrap();
    store
        .add_item_to_order(&order.id, "item-1", 1, Vec::new())
        .await
        .unwrap();
    let with_items = store
        .add_item_to_order(&order.id, "item-3", 1, Vec::new())
        .await
        .unwrap();

    let moved = with_items.items[1].id.clone();
    let split = store
        .split_bill(&order.id, &[moved], "table-5")
        .await
        .unwrap();
    assert_eq!(split.split_from.as_deref(), Some(order.id.as_str()));
    assert_eq!(split.subtotal, 16.99);

    let current = store.state().await.current_order.unwrap();
    assert_eq!(current.items.len(), 1);
    assert_eq!(current.subtotal, 14.99);
}

#[tokio::test]
async fn mutations_do_not_degrade_a_live_session() {
    let switch = live_but_unreachable();
    let store = PosStore::new(switch.clone());

    // 未经 load 路径降级，写操作直接把失败抛给调用方
    let err = store
        .update_table_status("table-1", TableStatus::Occupied)
        .await
        .unwrap_err();
    assert!(matches!(err, PosError::Transport { .. }));
    assert_eq!(switch.mode(), ConnectionMode::Live);
}

#[tokio::test]
async fn realtime_echoes_refresh_the_table_list() {
    let switch = live_but_unreachable();
    let store = PosStore::new(switch.clone());
    store.load_tables("loc-1").await.unwrap();

    store.setup_realtime("loc-1");

    // mutate through the (now shared) demo source; the local echo should
    // trigger a reload that picks the change up
    switch
        .current()
        .update_table(
            "table-1",
            DiningTableUpdate {
                status: Some(TableStatus::Reserved),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let mut reserved = false;
    for _ in 0..50 {
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        let state = store.state().await;
        if state
            .tables
            .iter()
            .any(|t| t.id == "table-1" && t.status == TableStatus::Reserved)
        {
            reserved = true;
            break;
        }
    }
    store.cleanup();
    assert!(reserved, "realtime echo should have refreshed the table list");
}

#[tokio::test]
async fn payment_settles_order_and_frees_table_in_snapshot() {
    let switch = live_but_unreachable();
    let store = PosStore::new(switch.clone());
    store.load_tables("loc-1").await.unwrap();
    store.load_menu("tenant-1").await.unwrap();

    let order = store
        .create_order("loc-1", "table-1", OrderType::DineIn)
        .await
        .unwrap();
    store
        .add_item_to_order(&order.id, "item-2", 1, Vec::new())
        .await
        .unwrap();

    let payment = store
        .record_payment(&order.id, 12.99, 1.50, PaymentMethod::Card)
        .await
        .unwrap();
    assert_eq!(payment.status, PaymentStatus::Completed);

    let state = store.state().await;
    assert!(state.current_order.is_none());
    let table = state.tables.iter().find(|t| t.id == "table-1").unwrap();
    assert_eq!(table.status, TableStatus::Ready);
}

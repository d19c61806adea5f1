//! 数据源抽象
//!
//! 所有存储通过同一个 [`DataSource`] 接口读写数据，在会话建立时选定
//! 一次实现：在线会话用 [`RemoteSource`]，离线演示会话用 [`MemorySource`]。
//! 各方法内部不再做在线/离线分支。
//!
//! [`SourceSwitch`] 持有当前数据源和连接模式，是"是否在跑真后端"这一
//! 事实的唯一来源；会话协调器和所有存储共享同一个句柄。

mod fixtures;
mod memory;
mod remote;

pub use fixtures::*;
pub use memory::MemorySource;
pub use remote::RemoteSource;

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tokio::sync::{broadcast, watch};

use shared::error::PosResult;
use shared::event::ChangeEvent;
use shared::models::*;

/// Whether the session runs against the live backend or the in-memory demo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionMode {
    Live,
    OfflineDemo,
}

impl ConnectionMode {
    pub fn is_offline(&self) -> bool {
        matches!(self, ConnectionMode::OfflineDemo)
    }
}

/// Uniform data access seam
///
/// One implementation per backing store. Implementations are responsible for
/// emitting [`ChangeEvent`]s for their own mutations where the backing store
/// does not do it for them.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Short label for logs
    fn describe(&self) -> &'static str;

    // ===== Tables =====
    async fn list_tables(&self, location_id: &str) -> PosResult<Vec<DiningTable>>;
    async fn create_table(&self, payload: DiningTableCreate) -> PosResult<DiningTable>;
    async fn update_table(&self, table_id: &str, update: DiningTableUpdate)
        -> PosResult<DiningTable>;

    // ===== Menu catalog =====
    async fn list_menu_items(&self, tenant_id: &str) -> PosResult<Vec<MenuItem>>;
    async fn list_menu_categories(&self, tenant_id: &str) -> PosResult<Vec<MenuCategory>>;

    // ===== Orders =====
    async fn create_order(&self, payload: OrderCreate) -> PosResult<Order>;
    /// Add an item to an order; returns the refreshed order with totals
    async fn add_order_item(&self, payload: OrderItemCreate) -> PosResult<Order>;
    /// Move the given items off an order onto a new order at the target
    /// table; returns the new order
    async fn split_order(
        &self,
        order_id: &str,
        item_ids: &[String],
        target_table_id: &str,
    ) -> PosResult<Order>;
    async fn list_active_orders(&self, location_id: &str) -> PosResult<Vec<Order>>;
    async fn update_order_item_status(
        &self,
        order_id: &str,
        item_id: &str,
        status: OrderItemStatus,
    ) -> PosResult<()>;

    // ===== Payments =====
    async fn record_payment(&self, payload: PaymentCreate) -> PosResult<Payment>;
    async fn list_payments(&self, location_id: &str) -> PosResult<Vec<Payment>>;

    // ===== Tenancy =====
    async fn create_tenant(&self, payload: TenantCreate) -> PosResult<Tenant>;
    async fn list_locations(&self, tenant_id: &str) -> PosResult<Vec<Location>>;
    async fn create_location(&self, payload: LocationCreate) -> PosResult<Location>;
    /// Staff rows (joined with tenants) for an auth identity
    async fn list_staff_tenants(&self, user_id: &str) -> PosResult<Vec<StaffTenant>>;

    // ===== Staff & customers =====
    async fn list_staff(&self, tenant_id: &str) -> PosResult<Vec<Staff>>;
    async fn create_staff(&self, payload: StaffCreate) -> PosResult<Staff>;
    async fn update_staff(&self, staff_id: &str, update: StaffUpdate) -> PosResult<Staff>;
    async fn list_customers(&self, tenant_id: &str) -> PosResult<Vec<Customer>>;
    async fn create_customer(&self, payload: CustomerCreate) -> PosResult<Customer>;
    async fn update_customer(&self, customer_id: &str, update: CustomerUpdate)
        -> PosResult<Customer>;
    async fn delete_customer(&self, customer_id: &str) -> PosResult<()>;

    // ===== Finance =====
    async fn list_financial_categories(
        &self,
        scope: FinanceScope,
        owner_id: &str,
    ) -> PosResult<Vec<FinancialCategory>>;
    async fn create_financial_category(
        &self,
        payload: FinancialCategoryCreate,
    ) -> PosResult<FinancialCategory>;
    async fn list_transactions(
        &self,
        scope: FinanceScope,
        owner_id: &str,
    ) -> PosResult<Vec<FinancialTransaction>>;
    async fn create_transaction(
        &self,
        payload: FinancialTransactionCreate,
    ) -> PosResult<FinancialTransaction>;
    async fn update_transaction(
        &self,
        transaction_id: &str,
        update: FinancialTransactionUpdate,
    ) -> PosResult<FinancialTransaction>;
    async fn delete_transaction(&self, transaction_id: &str) -> PosResult<()>;

    // ===== Change feed =====
    /// Subscribe to resource changes for a location
    ///
    /// Events for other locations may be delivered; subscribers filter.
    fn subscribe(&self, location_id: &str) -> broadcast::Receiver<ChangeEvent>;
}

/// Holder of the active data source and connection mode
///
/// 连接模式的唯一事实来源。降级 (degrade) 安装内存数据源并翻转模式，
/// 只发生一次；所有观察者通过 watch 通道看到同一个值。
pub struct SourceSwitch {
    current: RwLock<Arc<dyn DataSource>>,
    mode_tx: watch::Sender<ConnectionMode>,
}

impl SourceSwitch {
    /// Start live against the given remote source
    pub fn live(remote: Arc<dyn DataSource>) -> Arc<Self> {
        let (mode_tx, _) = watch::channel(ConnectionMode::Live);
        Arc::new(Self {
            current: RwLock::new(remote),
            mode_tx,
        })
    }

    /// Start directly in offline demo mode with seeded fixture data
    pub fn offline_demo() -> Arc<Self> {
        let (mode_tx, _) = watch::channel(ConnectionMode::OfflineDemo);
        Arc::new(Self {
            current: RwLock::new(Arc::new(MemorySource::with_fixtures()) as Arc<dyn DataSource>),
            mode_tx,
        })
    }

    /// The active data source
    pub fn current(&self) -> Arc<dyn DataSource> {
        self.current.read().expect("source lock poisoned").clone()
    }

    /// The current connection mode
    pub fn mode(&self) -> ConnectionMode {
        *self.mode_tx.borrow()
    }

    /// Watch mode changes
    pub fn watch(&self) -> watch::Receiver<ConnectionMode> {
        self.mode_tx.subscribe()
    }

    /// Degrade to the in-memory demo source
    ///
    /// Idempotent: once offline, further calls return the installed source
    /// unchanged so accumulated demo state survives repeated failures.
    pub fn degrade(&self) -> Arc<dyn DataSource> {
        let mut current = self.current.write().expect("source lock poisoned");
        if self.mode().is_offline() {
            return current.clone();
        }

        tracing::warn!(from = current.describe(), "degrading to offline demo source");
        let memory: Arc<dyn DataSource> = Arc::new(MemorySource::with_fixtures());
        *current = memory.clone();
        // send_replace updates the value even with no live watchers
        self.mode_tx.send_replace(ConnectionMode::OfflineDemo);
        memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn degrade_is_idempotent() {
        let switch = SourceSwitch::offline_demo();
        let first = switch.current();

        // already offline: degrade keeps the installed source
        let again = switch.degrade();
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(switch.mode(), ConnectionMode::OfflineDemo);
    }

    #[tokio::test]
    async fn degrade_flips_mode_once() {
        let remote: Arc<dyn DataSource> = Arc::new(MemorySource::empty());
        let switch = SourceSwitch::live(remote.clone());
        assert_eq!(switch.mode(), ConnectionMode::Live);

        let mut watcher = switch.watch();
        let installed = switch.degrade();
        assert!(!Arc::ptr_eq(&remote, &installed));
        assert_eq!(switch.mode(), ConnectionMode::OfflineDemo);
        assert!(watcher.has_changed().unwrap());
    }
}

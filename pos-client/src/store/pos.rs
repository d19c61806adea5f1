//! POS state store
//!
//! 桌台、菜单、当前订单与厨房视图的共享状态。所有读写都经过会话选定的
//! 数据源；读取路径在远程失败时降级到内存演示数据（模式翻转一次，由
//! [`SourceSwitch`] 统一记录），写入路径将错误原样抛给调用方。

use std::sync::{Arc, Mutex};

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use shared::error::PosResult;
use shared::models::*;

use crate::money;
use crate::source::SourceSwitch;

/// POS state snapshot
#[derive(Debug, Clone, Default)]
pub struct PosState {
    pub tables: Vec<DiningTable>,
    pub selected_table: Option<DiningTable>,
    pub menu_items: Vec<MenuItem>,
    pub categories: Vec<MenuCategory>,
    pub current_order: Option<Order>,
    /// Open orders for the kitchen display
    pub active_orders: Vec<Order>,
}

/// POS state store
pub struct PosStore {
    switch: Arc<SourceSwitch>,
    state: RwLock<PosState>,
    realtime: Mutex<Option<CancellationToken>>,
}

impl PosStore {
    pub fn new(switch: Arc<SourceSwitch>) -> Arc<Self> {
        Arc::new(Self {
            switch,
            state: RwLock::new(PosState::default()),
            realtime: Mutex::new(None),
        })
    }

    /// Snapshot of the store state
    pub async fn state(&self) -> PosState {
        self.state.read().await.clone()
    }

    // ===== Tables =====

    /// Load tables for a location
    ///
    /// A failed remote call degrades the session to the demo source and
    /// substitutes its data.
    pub async fn load_tables(&self, location_id: &str) -> PosResult<Vec<DiningTable>> {
        let source = self.switch.current();
        let tables = match source.list_tables(location_id).await {
            Ok(tables) => tables,
            Err(err) => {
                tracing::warn!(error = %err, "loading tables failed, degrading to demo data");
                self.switch.degrade().list_tables(location_id).await?
            }
        };
        self.state.write().await.tables = tables.clone();
        Ok(tables)
    }

    /// Create an ad-hoc table (pop-up seating)
    ///
    /// Always `is_ad_hoc: true` and `status: Ready`, regardless of source.
    pub async fn create_ad_hoc_table(
        &self,
        location_id: &str,
        name: &str,
        capacity: i32,
    ) -> PosResult<DiningTable> {
        let table = self
            .switch
            .current()
            .create_table(DiningTableCreate {
                location_id: location_id.to_string(),
                name: name.to_string(),
                capacity,
                status: TableStatus::Ready,
                is_ad_hoc: true,
            })
            .await?;
        self.state.write().await.tables.push(table.clone());
        Ok(table)
    }

    /// Update one table's status, mirroring the change locally
    pub async fn update_table_status(
        &self,
        table_id: &str,
        status: TableStatus,
    ) -> PosResult<DiningTable> {
        let table = self
            .switch
            .current()
            .update_table(
                table_id,
                DiningTableUpdate {
                    status: Some(status),
                    ..Default::default()
                },
            )
            .await?;

        let mut state = self.state.write().await;
        if let Some(existing) = state.tables.iter_mut().find(|t| t.id == table_id) {
            *existing = table.clone();
        }
        if let Some(selected) = &mut state.selected_table {
            if selected.id == table_id {
                *selected = table.clone();
            }
        }
        Ok(table)
    }

    /// Select a table (pure local)
    pub async fn select_table(&self, table: Option<DiningTable>) {
        self.state.write().await.selected_table = table;
    }

    // ===== Menu =====

    /// Load the menu catalog for a tenant
    ///
    /// Same degradation contract as [`load_tables`](Self::load_tables).
    pub async fn load_menu(&self, tenant_id: &str) -> PosResult<(Vec<MenuItem>, Vec<MenuCategory>)> {
        let source = self.switch.current();
        let loaded = async {
            let items = source.list_menu_items(tenant_id).await?;
            let categories = source.list_menu_categories(tenant_id).await?;
            Ok::<_, shared::error::PosError>((items, categories))
        }
        .await;

        let (items, categories) = match loaded {
            Ok(menu) => menu,
            Err(err) => {
                tracing::warn!(error = %err, "loading menu failed, degrading to demo data");
                let fallback = self.switch.degrade();
                let items = fallback.list_menu_items(tenant_id).await?;
                let categories = fallback.list_menu_categories(tenant_id).await?;
                (items, categories)
            }
        };

        let mut state = self.state.write().await;
        state.menu_items = items.clone();
        state.categories = categories.clone();
        Ok((items, categories))
    }

    // ===== Orders =====

    /// Create a new order for a table and make it current
    ///
    /// Seating the order marks the table occupied.
    pub async fn create_order(
        &self,
        location_id: &str,
        table_id: &str,
        order_type: OrderType,
    ) -> PosResult<Order> {
        let order = self
            .switch
            .current()
            .create_order(OrderCreate {
                location_id: location_id.to_string(),
                table_id: Some(table_id.to_string()),
                staff_id: None,
                order_type,
            })
            .await?;

        self.state.write().await.current_order = Some(order.clone());
        if let Err(err) = self.update_table_status(table_id, TableStatus::Occupied).await {
            tracing::warn!(error = %err, %table_id, "failed to mark table occupied");
        }
        Ok(order)
    }

    /// Add an item to an order; the current order picks up the new totals
    pub async fn add_item_to_order(
        &self,
        order_id: &str,
        menu_item_id: &str,
        quantity: i32,
        modifiers: Vec<String>,
    ) -> PosResult<Order> {
        let order = self
            .switch
            .current()
            .add_order_item(OrderItemCreate {
                order_id: order_id.to_string(),
                menu_item_id: menu_item_id.to_string(),
                quantity,
                modifiers,
            })
            .await?;

        let mut state = self.state.write().await;
        if state
            .current_order
            .as_ref()
            .is_some_and(|current| current.id == order_id)
        {
            state.current_order = Some(order.clone());
        }
        Ok(order)
    }

    /// Move the chosen items onto a new order at the target table
    pub async fn split_bill(
        &self,
        order_id: &str,
        item_ids: &[String],
        target_table_id: &str,
    ) -> PosResult<Order> {
        let split = self
            .switch
            .current()
            .split_order(order_id, item_ids, target_table_id)
            .await?;

        // Keep the local view of the parent order in step
        let mut state = self.state.write().await;
        if let Some(current) = &mut state.current_order {
            if current.id == order_id {
                current.items.retain(|item| !item_ids.contains(&item.id));
                money::recalculate_order(current);
            }
        }
        Ok(split)
    }

    // ===== Kitchen =====

    /// Load open orders for the kitchen display
    pub async fn load_active_orders(&self, location_id: &str) -> PosResult<Vec<Order>> {
        let orders = self
            .switch
            .current()
            .list_active_orders(location_id)
            .await?;
        self.state.write().await.active_orders = orders.clone();
        Ok(orders)
    }

    /// Advance one item's kitchen status
    pub async fn update_order_item_status(
        &self,
        order_id: &str,
        item_id: &str,
        status: OrderItemStatus,
    ) -> PosResult<()> {
        self.switch
            .current()
            .update_order_item_status(order_id, item_id, status)
            .await?;

        let mut state = self.state.write().await;
        for order in state
            .active_orders
            .iter_mut()
            .filter(|order| order.id == order_id)
        {
            if let Some(item) = order.items.iter_mut().find(|item| item.id == item_id) {
                item.status = status;
            }
        }
        Ok(())
    }

    // ===== Payments =====

    /// Settle an order; completing it frees its table
    pub async fn record_payment(
        &self,
        order_id: &str,
        amount: f64,
        tip: f64,
        method: PaymentMethod,
    ) -> PosResult<Payment> {
        let payment = self
            .switch
            .current()
            .record_payment(PaymentCreate {
                order_id: order_id.to_string(),
                amount,
                tip,
                method,
            })
            .await?;

        let mut state = self.state.write().await;
        let settled_table = state
            .current_order
            .as_ref()
            .filter(|order| order.id == order_id)
            .and_then(|order| order.table_id.clone());
        if let Some(table_id) = settled_table {
            if let Some(table) = state.tables.iter_mut().find(|t| t.id == table_id) {
                table.status = TableStatus::Ready;
            }
            state.current_order = None;
        }
        Ok(payment)
    }

    /// Payment history for a location
    pub async fn list_payments(&self, location_id: &str) -> PosResult<Vec<Payment>> {
        self.switch.current().list_payments(location_id).await
    }

    // ===== Realtime =====

    /// Subscribe to the change feed for a location
    ///
    /// Table changes reload the table list; order changes refresh the
    /// kitchen view. Skipped implicitly in demo mode: the memory source's
    /// feed only carries local echoes. No reconnect logic — a dropped feed
    /// ends the task.
    pub fn setup_realtime(self: &Arc<Self>, location_id: &str) {
        self.cleanup();

        let token = CancellationToken::new();
        let mut receiver = self.switch.current().subscribe(location_id);
        let store = self.clone();
        let location = location_id.to_string();
        let task_token = token.clone();

        tokio::spawn(async move {
            loop {
                let event = tokio::select! {
                    _ = task_token.cancelled() => break,
                    event = receiver.recv() => event,
                };
                match event {
                    Ok(event) => {
                        if event.is_for(TABLES_TABLE) {
                            if let Err(err) = store.load_tables(&location).await {
                                tracing::warn!(error = %err, "realtime table reload failed");
                            }
                        } else if event.is_for(ORDERS_TABLE) {
                            if let Err(err) = store.load_active_orders(&location).await {
                                tracing::warn!(error = %err, "realtime order reload failed");
                            }
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "change feed lagged");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        *self.realtime.lock().expect("realtime lock poisoned") = Some(token);
    }

    /// Tear down the realtime subscription
    pub fn cleanup(&self) {
        if let Some(token) = self.realtime.lock().expect("realtime lock poisoned").take() {
            token.cancel();
        }
    }
}

impl Drop for PosStore {
    fn drop(&mut self) {
        self.cleanup();
    }
}

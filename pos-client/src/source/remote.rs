//! Remote data source
//!
//! Drives the hosted backend through [`RestClient`]: row access for CRUD,
//! named procedures for totals / splitting / the change feed. Tenant
//! isolation is the backend's row-level security; this source only scopes
//! queries.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::broadcast;

use async_trait::async_trait;

use shared::error::{PosError, PosResult};
use shared::event::ChangeEvent;
use shared::models::*;
use shared::response::ApiEnvelope;

use super::DataSource;
use crate::config::Config;
use crate::http::RestClient;

const EVENT_CAPACITY: usize = 64;

/// 变更轮询过程返回的批次
#[derive(Debug, Deserialize)]
struct ChangeBatch {
    seq: u64,
    #[serde(default)]
    events: Vec<ChangeEvent>,
}

/// Remote implementation of [`DataSource`]
pub struct RemoteSource {
    client: Arc<RestClient>,
    poll_interval: Duration,
    /// One poll loop per subscribed location
    channels: Arc<DashMap<String, broadcast::Sender<ChangeEvent>>>,
}

impl RemoteSource {
    pub fn new(client: Arc<RestClient>, config: &Config) -> Self {
        Self {
            client,
            poll_interval: Duration::from_millis(config.realtime_poll_ms),
            channels: Arc::new(DashMap::new()),
        }
    }

    /// Fetch one order together with its items
    async fn fetch_order(&self, order_id: &str) -> PosResult<Order> {
        let mut order: Order = self
            .client
            .select(ORDERS_TABLE, &[("id", order_id)], None)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| PosError::not_found(format!("Order {order_id}")))?;

        order.items = self
            .client
            .select(ORDER_ITEMS_TABLE, &[("order_id", order_id)], None)
            .await?;
        Ok(order)
    }

    /// 后台轮询循环：没有订阅者时自然退出并注销通道
    fn spawn_poll_loop(&self, location_id: String, sender: broadcast::Sender<ChangeEvent>) {
        let client = self.client.clone();
        let channels = self.channels.clone();
        let interval = self.poll_interval;

        tokio::spawn(async move {
            let mut after_seq = 0u64;
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;

                if sender.receiver_count() == 0 {
                    tracing::debug!(%location_id, "change feed has no subscribers, stopping");
                    channels.remove(&location_id);
                    break;
                }

                let result: PosResult<ApiEnvelope<ChangeBatch>> = client
                    .rpc(
                        "poll_changes_pos_v1",
                        &json!({ "location_id": location_id, "after_seq": after_seq }),
                    )
                    .await;

                match result.and_then(|envelope| envelope.into_result(200)) {
                    Ok(batch) => {
                        after_seq = batch.seq;
                        for event in batch.events {
                            let _ = sender.send(event);
                        }
                    }
                    Err(err) => {
                        // 丢一个周期，不做重连退避
                        tracing::warn!(%location_id, error = %err, "change feed poll failed");
                    }
                }
            }
        });
    }
}

#[async_trait]
impl DataSource for RemoteSource {
    fn describe(&self) -> &'static str {
        "remote"
    }

    // ===== Tables =====

    async fn list_tables(&self, location_id: &str) -> PosResult<Vec<DiningTable>> {
        self.client
            .select(TABLES_TABLE, &[("location_id", location_id)], Some("name"))
            .await
    }

    async fn create_table(&self, payload: DiningTableCreate) -> PosResult<DiningTable> {
        self.client.insert(TABLES_TABLE, &payload).await
    }

    async fn update_table(
        &self,
        table_id: &str,
        update: DiningTableUpdate,
    ) -> PosResult<DiningTable> {
        self.client.update(TABLES_TABLE, table_id, &update).await
    }

    // ===== Menu catalog =====

    async fn list_menu_items(&self, tenant_id: &str) -> PosResult<Vec<MenuItem>> {
        self.client
            .select(
                MENU_ITEMS_TABLE,
                &[("tenant_id", tenant_id), ("is_available", "true")],
                Some("name"),
            )
            .await
    }

    async fn list_menu_categories(&self, tenant_id: &str) -> PosResult<Vec<MenuCategory>> {
        self.client
            .select(
                MENU_CATEGORIES_TABLE,
                &[("tenant_id", tenant_id), ("is_active", "true")],
                Some("sort_order"),
            )
            .await
    }

    // ===== Orders =====

    async fn create_order(&self, payload: OrderCreate) -> PosResult<Order> {
        self.client
            .insert(
                ORDERS_TABLE,
                &json!({
                    "location_id": payload.location_id,
                    "table_id": payload.table_id,
                    "staff_id": payload.staff_id,
                    "order_type": payload.order_type,
                    "status": OrderStatus::Pending,
                    "subtotal": 0,
                    "tax": 0,
                    "tip": 0,
                    "total": 0,
                }),
            )
            .await
    }

    async fn add_order_item(&self, payload: OrderItemCreate) -> PosResult<Order> {
        // Price is resolved server-side state, not trusted from the caller
        let menu_item: MenuItem = self
            .client
            .select(MENU_ITEMS_TABLE, &[("id", payload.menu_item_id.as_str())], None)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| PosError::not_found(format!("Menu item {}", payload.menu_item_id)))?;

        let _: OrderItem = self
            .client
            .insert(
                ORDER_ITEMS_TABLE,
                &json!({
                    "order_id": payload.order_id,
                    "menu_item_id": payload.menu_item_id,
                    "quantity": payload.quantity,
                    "unit_price": menu_item.base_price,
                    "modifiers": payload.modifiers,
                    "status": OrderItemStatus::Pending,
                }),
            )
            .await?;

        // Totals are recomputed by the backend procedure
        let envelope: ApiEnvelope<serde_json::Value> = self
            .client
            .rpc("update_order_total", &json!({ "order_id": payload.order_id }))
            .await?;
        envelope.into_result(200)?;

        self.fetch_order(&payload.order_id).await
    }

    async fn split_order(
        &self,
        order_id: &str,
        item_ids: &[String],
        target_table_id: &str,
    ) -> PosResult<Order> {
        let envelope: ApiEnvelope<String> = self
            .client
            .rpc(
                "split_order_pos_v1",
                &json!({
                    "original_order_id": order_id,
                    "item_ids": item_ids,
                    "target_table_id": target_table_id,
                }),
            )
            .await?;
        let new_order_id = envelope.into_result(200)?;
        self.fetch_order(&new_order_id).await
    }

    async fn list_active_orders(&self, location_id: &str) -> PosResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .client
            .select(ORDERS_TABLE, &[("location_id", location_id)], Some("created_at"))
            .await?;

        futures::future::try_join_all(
            orders
                .into_iter()
                .filter(|order| order.status.is_open())
                .map(|mut order| async move {
                    order.items = self
                        .client
                        .select(ORDER_ITEMS_TABLE, &[("order_id", order.id.as_str())], None)
                        .await?;
                    Ok::<_, PosError>(order)
                }),
        )
        .await
    }

    async fn update_order_item_status(
        &self,
        order_id: &str,
        item_id: &str,
        status: OrderItemStatus,
    ) -> PosResult<()> {
        tracing::debug!(%order_id, %item_id, "updating order item status");
        let _: OrderItem = self
            .client
            .update(ORDER_ITEMS_TABLE, item_id, &json!({ "status": status }))
            .await?;
        Ok(())
    }

    // ===== Payments =====

    async fn record_payment(&self, payload: PaymentCreate) -> PosResult<Payment> {
        let order = self.fetch_order(&payload.order_id).await?;

        let payment: Payment = self
            .client
            .insert(
                PAYMENTS_TABLE,
                &json!({
                    "order_id": payload.order_id,
                    "location_id": order.location_id,
                    "amount": payload.amount,
                    "tip": payload.tip,
                    "method": payload.method,
                    "status": PaymentStatus::Completed,
                }),
            )
            .await?;

        let _: Order = self
            .client
            .update(
                ORDERS_TABLE,
                &payload.order_id,
                &json!({ "status": OrderStatus::Completed, "tip": payload.tip }),
            )
            .await?;
        let envelope: ApiEnvelope<serde_json::Value> = self
            .client
            .rpc("update_order_total", &json!({ "order_id": payload.order_id }))
            .await?;
        envelope.into_result(200)?;

        // Settling the bill frees the table
        if let Some(table_id) = &order.table_id {
            let _: DiningTable = self
                .client
                .update(
                    TABLES_TABLE,
                    table_id,
                    &DiningTableUpdate {
                        status: Some(TableStatus::Ready),
                        ..Default::default()
                    },
                )
                .await?;
        }

        Ok(payment)
    }

    async fn list_payments(&self, location_id: &str) -> PosResult<Vec<Payment>> {
        self.client
            .select(
                PAYMENTS_TABLE,
                &[("location_id", location_id)],
                Some("created_at.desc"),
            )
            .await
    }

    // ===== Tenancy =====

    async fn create_tenant(&self, payload: TenantCreate) -> PosResult<Tenant> {
        self.client.insert(TENANTS_TABLE, &payload).await
    }

    async fn list_locations(&self, tenant_id: &str) -> PosResult<Vec<Location>> {
        self.client
            .select(LOCATIONS_TABLE, &[("tenant_id", tenant_id)], Some("name"))
            .await
    }

    async fn create_location(&self, payload: LocationCreate) -> PosResult<Location> {
        self.client.insert(LOCATIONS_TABLE, &payload).await
    }

    async fn list_staff_tenants(&self, user_id: &str) -> PosResult<Vec<StaffTenant>> {
        self.client
            .select_columns(
                STAFF_TABLE,
                "tenant_id,role,permissions,tenant:tenant_id(*)",
                &[("user_id", user_id), ("is_active", "true")],
                None,
            )
            .await
    }

    // ===== Staff & customers =====

    async fn list_staff(&self, tenant_id: &str) -> PosResult<Vec<Staff>> {
        self.client
            .select(STAFF_TABLE, &[("tenant_id", tenant_id)], Some("email"))
            .await
    }

    async fn create_staff(&self, payload: StaffCreate) -> PosResult<Staff> {
        self.client.insert(STAFF_TABLE, &payload).await
    }

    async fn update_staff(&self, staff_id: &str, update: StaffUpdate) -> PosResult<Staff> {
        self.client.update(STAFF_TABLE, staff_id, &update).await
    }

    async fn list_customers(&self, tenant_id: &str) -> PosResult<Vec<Customer>> {
        self.client
            .select(CUSTOMERS_TABLE, &[("tenant_id", tenant_id)], Some("name"))
            .await
    }

    async fn create_customer(&self, payload: CustomerCreate) -> PosResult<Customer> {
        self.client.insert(CUSTOMERS_TABLE, &payload).await
    }

    async fn update_customer(
        &self,
        customer_id: &str,
        update: CustomerUpdate,
    ) -> PosResult<Customer> {
        self.client.update(CUSTOMERS_TABLE, customer_id, &update).await
    }

    async fn delete_customer(&self, customer_id: &str) -> PosResult<()> {
        self.client.delete(CUSTOMERS_TABLE, customer_id).await
    }

    // ===== Finance =====

    async fn list_financial_categories(
        &self,
        scope: FinanceScope,
        owner_id: &str,
    ) -> PosResult<Vec<FinancialCategory>> {
        let owner_column = match scope {
            FinanceScope::Business => "tenant_id",
            FinanceScope::Personal => "user_id",
        };
        self.client
            .select(
                FINANCIAL_CATEGORIES_TABLE,
                &[
                    ("scope", &scope.to_string()),
                    (owner_column, owner_id),
                    ("is_active", "true"),
                ],
                Some("name"),
            )
            .await
    }

    async fn create_financial_category(
        &self,
        payload: FinancialCategoryCreate,
    ) -> PosResult<FinancialCategory> {
        self.client.insert(FINANCIAL_CATEGORIES_TABLE, &payload).await
    }

    async fn list_transactions(
        &self,
        scope: FinanceScope,
        owner_id: &str,
    ) -> PosResult<Vec<FinancialTransaction>> {
        let owner_column = match scope {
            FinanceScope::Business => "tenant_id",
            FinanceScope::Personal => "user_id",
        };
        self.client
            .select(
                FINANCIAL_TRANSACTIONS_TABLE,
                &[("scope", &scope.to_string()), (owner_column, owner_id)],
                Some("transaction_date.desc"),
            )
            .await
    }

    async fn create_transaction(
        &self,
        payload: FinancialTransactionCreate,
    ) -> PosResult<FinancialTransaction> {
        self.client.insert(FINANCIAL_TRANSACTIONS_TABLE, &payload).await
    }

    async fn update_transaction(
        &self,
        transaction_id: &str,
        update: FinancialTransactionUpdate,
    ) -> PosResult<FinancialTransaction> {
        self.client
            .update(FINANCIAL_TRANSACTIONS_TABLE, transaction_id, &update)
            .await
    }

    async fn delete_transaction(&self, transaction_id: &str) -> PosResult<()> {
        self.client.delete(FINANCIAL_TRANSACTIONS_TABLE, transaction_id).await
    }

    // ===== Change feed =====

    fn subscribe(&self, location_id: &str) -> broadcast::Receiver<ChangeEvent> {
        use dashmap::mapref::entry::Entry;

        match self.channels.entry(location_id.to_string()) {
            Entry::Occupied(entry) => entry.get().subscribe(),
            Entry::Vacant(entry) => {
                let (sender, receiver) = broadcast::channel(EVENT_CAPACITY);
                entry.insert(sender.clone());
                self.spawn_poll_loop(location_id.to_string(), sender);
                receiver
            }
        }
    }
}

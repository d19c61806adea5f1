//! Directory store
//!
//! Staff roster and customer book for the current tenant. Role and
//! permission changes go through the data source; the backend's row-level
//! security decides what the caller may actually touch.

use std::sync::Arc;

use tokio::sync::RwLock;

use shared::error::{PosError, PosResult};
use shared::models::*;

use crate::source::SourceSwitch;

#[derive(Debug, Clone, Default)]
struct DirectoryState {
    staff: Vec<Staff>,
    customers: Vec<Customer>,
}

/// Staff & customer store
pub struct DirectoryStore {
    switch: Arc<SourceSwitch>,
    state: RwLock<DirectoryState>,
}

impl DirectoryStore {
    pub fn new(switch: Arc<SourceSwitch>) -> Arc<Self> {
        Arc::new(Self {
            switch,
            state: RwLock::new(DirectoryState::default()),
        })
    }

    // ===== Staff =====

    pub async fn load_staff(&self, tenant_id: &str) -> PosResult<Vec<Staff>> {
        let staff = self.switch.current().list_staff(tenant_id).await?;
        self.state.write().await.staff = staff.clone();
        Ok(staff)
    }

    /// Invite a staff member into the tenant
    pub async fn invite_staff(
        &self,
        tenant_id: &str,
        email: &str,
        role: StaffRole,
        permissions: Vec<String>,
    ) -> PosResult<Staff> {
        if email.trim().is_empty() {
            return Err(PosError::validation("email must not be empty"));
        }

        let member = self
            .switch
            .current()
            .create_staff(StaffCreate {
                tenant_id: tenant_id.to_string(),
                // 受邀者首次登录前还没有认证身份，占位等待绑定
                user_id: format!("invited:{email}"),
                email: email.to_string(),
                role,
                permissions,
                is_active: true,
            })
            .await?;
        self.state.write().await.staff.push(member.clone());
        Ok(member)
    }

    pub async fn set_staff_role(&self, staff_id: &str, role: StaffRole) -> PosResult<Staff> {
        self.apply_staff_update(
            staff_id,
            StaffUpdate {
                role: Some(role),
                ..Default::default()
            },
        )
        .await
    }

    /// Activate or deactivate a staff member
    pub async fn set_staff_active(&self, staff_id: &str, is_active: bool) -> PosResult<Staff> {
        self.apply_staff_update(
            staff_id,
            StaffUpdate {
                is_active: Some(is_active),
                ..Default::default()
            },
        )
        .await
    }

    async fn apply_staff_update(&self, staff_id: &str, update: StaffUpdate) -> PosResult<Staff> {
        let member = self.switch.current().update_staff(staff_id, update).await?;
        let mut state = self.state.write().await;
        if let Some(existing) = state.staff.iter_mut().find(|s| s.id == staff_id) {
            *existing = member.clone();
        }
        Ok(member)
    }

    // ===== Customers =====

    pub async fn load_customers(&self, tenant_id: &str) -> PosResult<Vec<Customer>> {
        let customers = self.switch.current().list_customers(tenant_id).await?;
        self.state.write().await.customers = customers.clone();
        Ok(customers)
    }

    pub async fn create_customer(&self, payload: CustomerCreate) -> PosResult<Customer> {
        let customer = self.switch.current().create_customer(payload).await?;
        self.state.write().await.customers.push(customer.clone());
        Ok(customer)
    }

    pub async fn update_customer(
        &self,
        customer_id: &str,
        update: CustomerUpdate,
    ) -> PosResult<Customer> {
        let customer = self
            .switch
            .current()
            .update_customer(customer_id, update)
            .await?;
        let mut state = self.state.write().await;
        if let Some(existing) = state.customers.iter_mut().find(|c| c.id == customer_id) {
            *existing = customer.clone();
        }
        Ok(customer)
    }

    pub async fn delete_customer(&self, customer_id: &str) -> PosResult<()> {
        self.switch.current().delete_customer(customer_id).await?;
        self.state
            .write()
            .await
            .customers
            .retain(|c| c.id != customer_id);
        Ok(())
    }

    pub async fn staff(&self) -> Vec<Staff> {
        self.state.read().await.staff.clone()
    }

    pub async fn customers(&self) -> Vec<Customer> {
        self.state.read().await.customers.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceSwitch;

    #[tokio::test]
    async fn demo_roster_is_seeded() {
        let store = DirectoryStore::new(SourceSwitch::offline_demo());
        let staff = store.load_staff("demo-tenant").await.unwrap();
        assert_eq!(staff.len(), 4);
        assert!(staff.iter().any(|s| s.role == StaffRole::Chef));

        let customers = store.load_customers("demo-tenant").await.unwrap();
        assert_eq!(customers.len(), 3);
    }

    #[tokio::test]
    async fn invite_rejects_empty_email() {
        let store = DirectoryStore::new(SourceSwitch::offline_demo());
        let err = store
            .invite_staff("demo-tenant", "  ", StaffRole::Waiter, vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, PosError::Validation { .. }));
    }

    #[tokio::test]
    async fn deactivating_staff_updates_snapshot() {
        let store = DirectoryStore::new(SourceSwitch::offline_demo());
        let staff = store.load_staff("demo-tenant").await.unwrap();
        let waiter = staff
            .iter()
            .find(|s| s.role == StaffRole::Waiter)
            .unwrap()
            .clone();

        let updated = store.set_staff_active(&waiter.id, false).await.unwrap();
        assert!(!updated.is_active);
        let snapshot = store.staff().await;
        let mirrored = snapshot.iter().find(|s| s.id == waiter.id).unwrap();
        assert!(!mirrored.is_active);
    }

    #[tokio::test]
    async fn customer_lifecycle_round_trips() {
        let store = DirectoryStore::new(SourceSwitch::offline_demo());
        store.load_customers("demo-tenant").await.unwrap();

        let created = store
            .create_customer(CustomerCreate {
                tenant_id: "demo-tenant".to_string(),
                name: "Ana García".to_string(),
                email: Some("ana@example.com".to_string()),
                phone: None,
            })
            .await
            .unwrap();
        assert_eq!(store.customers().await.len(), 4);

        store
            .update_customer(
                &created.id,
                CustomerUpdate {
                    phone: Some("(555) 000-1111".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        store.delete_customer(&created.id).await.unwrap();
        assert_eq!(store.customers().await.len(), 3);
    }
}

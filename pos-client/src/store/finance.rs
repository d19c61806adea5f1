//! Finance store
//!
//! Financial categories and transactions per scope: business rows belong to
//! the current tenant, personal rows to the signed-in user. Summary totals
//! are computed with decimal arithmetic over the loaded snapshot.

use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::sync::RwLock;

use shared::error::PosResult;
use shared::models::*;

use crate::money;
use crate::source::SourceSwitch;

/// Income/expense totals over the loaded transactions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinanceSummary {
    pub income: f64,
    pub expense: f64,
    pub net: f64,
}

#[derive(Debug, Clone, Default)]
struct FinanceState {
    categories: Vec<FinancialCategory>,
    transactions: Vec<FinancialTransaction>,
}

/// Finance state store
pub struct FinanceStore {
    switch: Arc<SourceSwitch>,
    state: RwLock<FinanceState>,
}

impl FinanceStore {
    pub fn new(switch: Arc<SourceSwitch>) -> Arc<Self> {
        Arc::new(Self {
            switch,
            state: RwLock::new(FinanceState::default()),
        })
    }

    /// Load categories and transactions for one scope
    ///
    /// `owner_id` is the tenant id for business scope, the user id for
    /// personal scope.
    pub async fn load(&self, scope: FinanceScope, owner_id: &str) -> PosResult<()> {
        let source = self.switch.current();
        let categories = source.list_financial_categories(scope, owner_id).await?;
        let transactions = source.list_transactions(scope, owner_id).await?;

        let mut state = self.state.write().await;
        state.categories = categories;
        state.transactions = transactions;
        Ok(())
    }

    pub async fn categories(&self) -> Vec<FinancialCategory> {
        self.state.read().await.categories.clone()
    }

    pub async fn transactions(&self) -> Vec<FinancialTransaction> {
        self.state.read().await.transactions.clone()
    }

    pub async fn create_category(
        &self,
        payload: FinancialCategoryCreate,
    ) -> PosResult<FinancialCategory> {
        let category = self
            .switch
            .current()
            .create_financial_category(payload)
            .await?;
        self.state.write().await.categories.push(category.clone());
        Ok(category)
    }

    pub async fn create_transaction(
        &self,
        payload: FinancialTransactionCreate,
    ) -> PosResult<FinancialTransaction> {
        let transaction = self.switch.current().create_transaction(payload).await?;
        self.state
            .write()
            .await
            .transactions
            .insert(0, transaction.clone());
        Ok(transaction)
    }

    pub async fn update_transaction(
        &self,
        transaction_id: &str,
        update: FinancialTransactionUpdate,
    ) -> PosResult<FinancialTransaction> {
        let transaction = self
            .switch
            .current()
            .update_transaction(transaction_id, update)
            .await?;

        let mut state = self.state.write().await;
        if let Some(existing) = state
            .transactions
            .iter_mut()
            .find(|t| t.id == transaction_id)
        {
            *existing = transaction.clone();
        }
        Ok(transaction)
    }

    pub async fn delete_transaction(&self, transaction_id: &str) -> PosResult<()> {
        self.switch
            .current()
            .delete_transaction(transaction_id)
            .await?;
        self.state
            .write()
            .await
            .transactions
            .retain(|t| t.id != transaction_id);
        Ok(())
    }

    /// Totals over the loaded transactions
    pub async fn summary(&self) -> FinanceSummary {
        let state = self.state.read().await;
        let mut income = Decimal::ZERO;
        let mut expense = Decimal::ZERO;
        for transaction in &state.transactions {
            let amount = money::to_decimal(transaction.amount);
            match transaction.kind {
                FinanceKind::Income => income += amount,
                FinanceKind::Expense => expense += amount,
            }
        }
        FinanceSummary {
            income: money::to_f64(income),
            expense: money::to_f64(expense),
            net: money::to_f64(income - expense),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceSwitch;
    use chrono::NaiveDate;

    fn transaction(title: &str, amount: f64, kind: FinanceKind) -> FinancialTransactionCreate {
        FinancialTransactionCreate {
            scope: FinanceScope::Business,
            tenant_id: Some("demo-tenant".to_string()),
            user_id: None,
            category_id: None,
            title: title.to_string(),
            description: None,
            amount,
            kind,
            payment_method: PaymentMethod::Cash,
            transaction_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            reference_number: None,
            tags: Vec::new(),
        }
    }

    #[tokio::test]
    async fn summary_totals_income_and_expense() {
        let store = FinanceStore::new(SourceSwitch::offline_demo());

        store
            .create_transaction(transaction("Dinner service", 1250.40, FinanceKind::Income))
            .await
            .unwrap();
        store
            .create_transaction(transaction("Produce order", 310.15, FinanceKind::Expense))
            .await
            .unwrap();
        store
            .create_transaction(transaction("Catering", 99.60, FinanceKind::Income))
            .await
            .unwrap();

        let summary = store.summary().await;
        assert_eq!(summary.income, 1350.0);
        assert_eq!(summary.expense, 310.15);
        assert_eq!(summary.net, 1039.85);
    }

    #[tokio::test]
    async fn scope_separates_business_and_personal() {
        let store = FinanceStore::new(SourceSwitch::offline_demo());

        store
            .create_transaction(transaction("Business income", 100.0, FinanceKind::Income))
            .await
            .unwrap();
        let mut personal = transaction("Groceries", 42.0, FinanceKind::Expense);
        personal.scope = FinanceScope::Personal;
        personal.tenant_id = None;
        personal.user_id = Some("user-1".to_string());
        store.create_transaction(personal).await.unwrap();

        store.load(FinanceScope::Personal, "user-1").await.unwrap();
        let transactions = store.transactions().await;
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].title, "Groceries");

        store
            .load(FinanceScope::Business, "demo-tenant")
            .await
            .unwrap();
        assert_eq!(store.transactions().await.len(), 1);
    }

    #[tokio::test]
    async fn delete_removes_from_snapshot() {
        let store = FinanceStore::new(SourceSwitch::offline_demo());
        let created = store
            .create_transaction(transaction("Mistake", 10.0, FinanceKind::Expense))
            .await
            .unwrap();

        store.delete_transaction(&created.id).await.unwrap();
        assert!(store.transactions().await.is_empty());

        let err = store.delete_transaction(&created.id).await.unwrap_err();
        assert!(matches!(err, shared::error::PosError::NotFound { .. }));
    }
}

//! Financial Tracking Models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Backend table for financial categories
pub const FINANCIAL_CATEGORIES_TABLE: &str = "financial_categories_pos_v1";
/// Backend table for financial transactions
pub const FINANCIAL_TRANSACTIONS_TABLE: &str = "financial_transactions_pos_v1";

/// Whether a record belongs to the business (tenant) or to one user
///
/// The scope determines the owning key: business rows carry `tenant_id`,
/// personal rows carry `user_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinanceScope {
    Business,
    Personal,
}

impl std::fmt::Display for FinanceScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FinanceScope::Business => write!(f, "business"),
            FinanceScope::Personal => write!(f, "personal"),
        }
    }
}

/// Income or expense
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinanceKind {
    Income,
    Expense,
}

/// How a transaction was paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
    Digital,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Cash => write!(f, "cash"),
            PaymentMethod::Card => write!(f, "card"),
            PaymentMethod::Digital => write!(f, "digital"),
        }
    }
}

/// Financial category entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialCategory {
    pub id: String,
    pub scope: FinanceScope,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FinanceKind,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub icon: String,
    pub is_active: bool,
}

/// Create financial category payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialCategoryCreate {
    pub scope: FinanceScope,
    pub tenant_id: Option<String>,
    pub user_id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FinanceKind,
    pub color: Option<String>,
    pub icon: Option<String>,
}

/// Financial transaction entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialTransaction {
    pub id: String,
    pub scope: FinanceScope,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub category_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: FinanceKind,
    pub payment_method: PaymentMethod,
    pub transaction_date: NaiveDate,
    #[serde(default)]
    pub reference_number: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Create financial transaction payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialTransactionCreate {
    pub scope: FinanceScope,
    pub tenant_id: Option<String>,
    pub user_id: Option<String>,
    pub category_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: FinanceKind,
    pub payment_method: PaymentMethod,
    pub transaction_date: NaiveDate,
    pub reference_number: Option<String>,
    pub tags: Vec<String>,
}

/// Update financial transaction payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinancialTransactionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<FinanceKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

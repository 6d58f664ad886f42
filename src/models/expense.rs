// src/models/expense.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "expense_category", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpenseCategory {
    Supplier,
    Rent,
    Merchandise,
    Services,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "expense_payment_method", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpensePaymentMethod {
    Cash,
    Transfer,
    Card,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: i64,
    pub description: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub category: ExpenseCategory,
    pub provider: Option<String>,
    pub payment_method: Option<ExpensePaymentMethod>,
    pub receipt_number: Option<String>,
    pub notes: Option<String>,
    pub client_id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Campos graváveis de um gasto, já validados.
#[derive(Debug, Clone)]
pub struct ExpenseDraft {
    pub description: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub category: ExpenseCategory,
    pub provider: Option<String>,
    pub payment_method: Option<ExpensePaymentMethod>,
    pub receipt_number: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    pub category: Option<ExpenseCategory>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub provider: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpensePage {
    pub expenses: Vec<Expense>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

// --- Relatórios ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub category: ExpenseCategory,
    pub total: Decimal,
    pub count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseSummary {
    pub by_category: Vec<CategoryTotal>,
    pub grand_total: Decimal,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthTotal {
    pub month: i32,
    pub total: Decimal,
    pub count: i64,
}

// src/models/commission.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::auth::UserSummary;

// Comissão mensal de um vendedor. Chave natural: (user_id, month, year).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Commission {
    pub id: i64,
    pub user_id: i64,
    pub month: i32,
    pub year: i32,
    pub total_sales: Decimal,
    pub net_commission: Decimal,
    pub base_salary: Option<Decimal>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommissionView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub commission: Commission,
    pub user_name: String,
}

// Soma das vendas de um usuário num mês.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow)]
pub struct PeriodTotals {
    pub total_sales: Decimal,
    pub sales_count: i64,
}

// --- Resumo ao vivo (mi-resumen-comision) ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommissionConfiguration {
    pub commission_percentage: Decimal,
    pub advertising_expense: Decimal,
    pub base_salary: Decimal,
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CurrentMonthSummary {
    pub month: i32,
    pub year: i32,
    pub total_sales: Decimal,
    pub sales_count: i64,
    pub gross_commission: Decimal,
    pub advertising_expense: Decimal,
    pub net_commission: Decimal,
    pub base_salary: Decimal,
    pub total_to_collect: Decimal,
    /// Já existe uma linha de comissão gravada para o período?
    pub recorded: bool,
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommissionSummary {
    pub user: UserSummary,
    pub configuration: CommissionConfiguration,
    pub current_month: CurrentMonthSummary,
    pub history: Vec<Commission>,
}

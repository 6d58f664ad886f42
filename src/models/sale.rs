// src/models/sale.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::common::validation::validate_not_negative;
use crate::models::auth::UserSummary;
use crate::models::catalog::{ProductColor, ProductSize};

// --- Formas de pagamento ---
// O tipo (e não o nome exibido) decide se o desconto financiado se aplica.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_method_kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethodKind {
    FinancedTransfer,
    ZeroRateTransfer,
    BankTransfer,
    Cash,
}

impl PaymentMethodKind {
    pub fn allows_financed_discount(&self) -> bool {
        matches!(self, PaymentMethodKind::FinancedTransfer)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    pub id: i64,
    pub name: String,
    pub kind: PaymentMethodKind,
}

// --- Venda (cabeçalho) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: i64,
    pub seller_id: i64,
    pub customer_id: i64,
    pub payment_method_id: i64,
    pub cost: Decimal,
    pub sale_price: Decimal,
    pub profit: Decimal,
    pub total: Decimal,
    pub deposit: Option<Decimal>,
    pub balance: Decimal,
    pub discount: Decimal,
    pub financed_discount: bool,
    pub final_total: Decimal,
    pub receipt_path: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Valores financeiros de uma venda, calculados antes de gravar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleFigures {
    pub cost: Decimal,
    pub sale_price: Decimal,
    pub profit: Decimal,
    pub total: Decimal,
    pub deposit: Option<Decimal>,
    pub balance: Decimal,
    pub discount: Decimal,
    pub financed_discount: bool,
    pub final_total: Decimal,
}

// Linha da consulta de cabeçalho, com os nomes das entidades relacionadas.
#[derive(Debug, Clone, FromRow)]
pub struct SaleHeaderRow {
    #[sqlx(flatten)]
    pub sale: Sale,
    pub customer_name: String,
    pub seller_name: String,
    pub seller_email: String,
    pub payment_method_name: String,
    pub payment_method_kind: PaymentMethodKind,
}

// --- Itens da venda ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleLineItem {
    pub id: i64,
    pub sale_id: i64,
    pub product_id: i64,
    pub size: ProductSize,
    pub color: ProductColor,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleLineView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub item: SaleLineItem,
    pub product_name: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
    pub id: i64,
    pub name: String,
}

// Venda com cliente, vendedor, forma de pagamento e itens anexados.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleDetail {
    #[serde(flatten)]
    pub sale: Sale,
    pub customer: CustomerSummary,
    pub seller: UserSummary,
    pub payment_method: PaymentMethod,
    pub items: Vec<SaleLineView>,
}

// ---
// Payloads
// ---

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleLinePayload {
    pub product_id: i64,
    pub size: ProductSize,
    pub color: ProductColor,
    #[validate(range(min = 1, message = "La cantidad debe ser al menos 1."))]
    pub quantity: i32,
    #[validate(custom(function = "validate_not_negative"))]
    pub unit_price: Decimal,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSalePayload {
    /// Vendedor; se ausente, o próprio usuário autenticado.
    pub seller_id: Option<i64>,
    pub customer_id: i64,
    pub payment_method_id: i64,
    /// Se ausente ou zero, vira a soma dos itens.
    #[validate(custom(function = "validate_not_negative"))]
    pub sale_price: Option<Decimal>,
    #[validate(custom(function = "validate_not_negative"))]
    pub deposit: Option<Decimal>,
    #[serde(default)]
    pub apply_financed_discount: bool,
    pub notes: Option<String>,
    #[validate(length(min = 1, message = "La venta debe tener al menos un producto."), nested)]
    pub items: Vec<SaleLinePayload>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSalePayload {
    pub seller_id: Option<i64>,
    pub customer_id: Option<i64>,
    pub payment_method_id: Option<i64>,
    #[validate(custom(function = "validate_not_negative"))]
    pub deposit: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentUpdateResponse {
    pub message: String,
    pub sale: SaleDetail,
    pub balance: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(items: Vec<SaleLinePayload>) -> CreateSalePayload {
        CreateSalePayload {
            seller_id: None,
            customer_id: 1,
            payment_method_id: 1,
            sale_price: None,
            deposit: None,
            apply_financed_discount: false,
            notes: None,
            items,
        }
    }

    #[test]
    fn sale_without_items_is_rejected() {
        let errors = payload(Vec::new()).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("items"));
    }

    #[test]
    fn invalid_line_is_reported_through_items() {
        let line = SaleLinePayload {
            product_id: 3,
            size: ProductSize::M,
            color: ProductColor::Azul,
            quantity: 0,
            unit_price: Decimal::new(100, 0),
        };
        assert!(line.validate().is_err());
        assert!(payload(vec![line]).validate().is_err());
    }
}

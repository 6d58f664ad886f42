// src/models/order.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::sale::SaleDetail;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "order_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Dispatched,
    Cancelled,
}

impl OrderStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "pending" | "pendiente" => Some(OrderStatus::Pending),
            "dispatched" | "despachado" => Some(OrderStatus::Dispatched),
            "cancelled" | "cancelado" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

// Pedido: um por venda, sempre nasce pendente.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub sale_id: i64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub sale: SaleDetail,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_statuses_only() {
        assert_eq!(OrderStatus::parse("Dispatched"), Some(OrderStatus::Dispatched));
        assert_eq!(OrderStatus::parse("pendiente"), Some(OrderStatus::Pending));
        assert_eq!(OrderStatus::parse("lost"), None);
    }
}

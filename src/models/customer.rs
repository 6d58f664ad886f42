// src/models/customer.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPayload {
    #[validate(length(min = 1, max = 150, message = "El nombre es obligatorio."))]
    pub name: String,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    #[validate(email(message = "El email no es válido."))]
    pub email: Option<String>,
    pub address: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 100))]
    pub province: Option<String>,
    pub notes: Option<String>,
}

/// Quantas linhas ainda referenciam um cliente.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, FromRow)]
pub struct CustomerReferences {
    pub sales: i64,
    pub orders: i64,
    pub expenses: i64,
}

impl CustomerReferences {
    pub fn is_referenced(&self) -> bool {
        self.sales > 0 || self.orders > 0 || self.expenses > 0
    }
}

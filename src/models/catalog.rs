// src/models/catalog.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

// --- Ciclo de vida (soft delete) ---
// Inativo: fora das listagens padrão, mas ainda referenciável pelo histórico.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "lifecycle_state", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    Active,
    Inactive,
}

// --- Talles ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "product_size", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum ProductSize {
    S,
    M,
    L,
    Xl,
    Xxl,
}

impl ProductSize {
    pub const ALL: [ProductSize; 5] = [
        ProductSize::S,
        ProductSize::M,
        ProductSize::L,
        ProductSize::Xl,
        ProductSize::Xxl,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ProductSize::S => "S",
            ProductSize::M => "M",
            ProductSize::L => "L",
            ProductSize::Xl => "XL",
            ProductSize::Xxl => "XXL",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL.into_iter().find(|s| s.label().eq_ignore_ascii_case(raw))
    }
}

// --- Colores ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "product_color", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductColor {
    Blanco,
    Negro,
    Azul,
    Rojo,
    Verde,
    Amarillo,
    Gris,
    Rosa,
    Morado,
    Naranja,
}

impl ProductColor {
    pub const ALL: [ProductColor; 10] = [
        ProductColor::Blanco,
        ProductColor::Negro,
        ProductColor::Azul,
        ProductColor::Rojo,
        ProductColor::Verde,
        ProductColor::Amarillo,
        ProductColor::Gris,
        ProductColor::Rosa,
        ProductColor::Morado,
        ProductColor::Naranja,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ProductColor::Blanco => "Blanco",
            ProductColor::Negro => "Negro",
            ProductColor::Azul => "Azul",
            ProductColor::Rojo => "Rojo",
            ProductColor::Verde => "Verde",
            ProductColor::Amarillo => "Amarillo",
            ProductColor::Gris => "Gris",
            ProductColor::Rosa => "Rosa",
            ProductColor::Morado => "Morado",
            ProductColor::Naranja => "Naranja",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL.into_iter().find(|c| c.label().eq_ignore_ascii_case(raw))
    }
}

// --- Produto ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub unit_cost: Decimal,
    pub state: Lifecycle,
    pub sizes: Vec<ProductSize>,
    pub colors: Vec<ProductColor>,
    pub product_type_id: Option<i64>,
    pub team_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

// Campos graváveis de um produto.
#[derive(Debug, Clone)]
pub struct ProductDraft {
    pub name: String,
    pub unit_cost: Decimal,
    pub state: Lifecycle,
    pub sizes: Vec<ProductSize>,
    pub colors: Vec<ProductColor>,
    pub product_type_id: Option<i64>,
    pub team_id: Option<i64>,
}

// --- Tipos de produto e equipes ---
// As duas tabelas têm o mesmo formato; o `ClassificationKind` escolhe qual.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationKind {
    ProductType,
    Team,
}

impl ClassificationKind {
    pub fn table(&self) -> &'static str {
        match self {
            ClassificationKind::ProductType => "product_types",
            ClassificationKind::Team => "teams",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ClassificationKind::ProductType => "Tipo de producto",
            ClassificationKind::Team => "Equipo",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub id: i64,
    pub name: String,
    pub state: Lifecycle,
    pub created_at: DateTime<Utc>,
}

// --- Estoque por variante (produto, talle, color) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockEntry {
    pub id: i64,
    pub product_id: i64,
    pub size: ProductSize,
    pub color: ProductColor,
    pub quantity: i32,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub entry: StockEntry,
    pub product_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_parse_case_insensitively() {
        assert_eq!(ProductSize::parse("xl"), Some(ProductSize::Xl));
        assert_eq!(ProductSize::parse("XXL"), Some(ProductSize::Xxl));
        assert_eq!(ProductSize::parse("XS"), None);
    }

    #[test]
    fn colors_parse_case_insensitively() {
        assert_eq!(ProductColor::parse("azul"), Some(ProductColor::Azul));
        assert_eq!(ProductColor::parse(" Naranja "), Some(ProductColor::Naranja));
        assert_eq!(ProductColor::parse("Fucsia"), None);
    }

    #[test]
    fn json_uses_display_labels() {
        assert_eq!(serde_json::to_string(&ProductSize::Xxl).unwrap(), "\"XXL\"");
        assert_eq!(serde_json::to_string(&ProductColor::Azul).unwrap(), "\"Azul\"");
        assert_eq!(serde_json::to_string(&Lifecycle::Inactive).unwrap(), "\"inactive\"");
    }
}

// src/db/catalog_repo.rs

use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::{db_utils::is_unique_violation, error::AppError},
    models::catalog::{
        Classification, ClassificationKind, Lifecycle, Product, ProductColor, ProductDraft,
        ProductSize, StockEntry, StockView,
    },
};

const STOCK_VIEW_SELECT: &str = r#"
    SELECT s.*, p.name AS product_name
    FROM stock_entries s
    JOIN products p ON p.id = s.product_id
"#;

#[derive(Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Produtos
    // ---

    pub async fn list_active_products(&self) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE state = 'ACTIVE' ORDER BY name ASC",
        )
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    pub async fn find_product<'e, E>(&self, executor: E, id: i64) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(product)
    }

    pub async fn create_product<'e, E>(&self, executor: E, draft: &ProductDraft) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, unit_cost, state, sizes, colors, product_type_id, team_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
            .bind(&draft.name)
            .bind(draft.unit_cost)
            .bind(draft.state)
            .bind(&draft.sizes)
            .bind(&draft.colors)
            .bind(draft.product_type_id)
            .bind(draft.team_id)
            .fetch_one(executor)
            .await?;
        Ok(product)
    }

    pub async fn update_product<'e, E>(
        &self,
        executor: E,
        id: i64,
        draft: &ProductDraft,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET name = $2, unit_cost = $3, state = $4, sizes = $5, colors = $6,
                product_type_id = $7, team_id = $8
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(id)
            .bind(&draft.name)
            .bind(draft.unit_cost)
            .bind(draft.state)
            .bind(&draft.sizes)
            .bind(&draft.colors)
            .bind(draft.product_type_id)
            .bind(draft.team_id)
            .fetch_optional(executor)
            .await?;
        Ok(product)
    }

    /// Soft delete: o produto continua referenciável pelas vendas antigas.
    pub async fn deactivate_product<'e, E>(&self, executor: E, id: i64) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("UPDATE products SET state = 'INACTIVE' WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ---
    // Tipos de produto / Equipes
    // ---
    // Os nomes de tabela vêm de `ClassificationKind::table()`, nunca da requisição.

    pub async fn list_active_classifications(
        &self,
        kind: ClassificationKind,
    ) -> Result<Vec<Classification>, AppError> {
        let sql = format!(
            "SELECT * FROM {} WHERE state = 'ACTIVE' ORDER BY name ASC",
            kind.table()
        );
        let rows = sqlx::query_as::<_, Classification>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn find_classification<'e, E>(
        &self,
        executor: E,
        kind: ClassificationKind,
        id: i64,
    ) -> Result<Option<Classification>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT * FROM {} WHERE id = $1", kind.table());
        let row = sqlx::query_as::<_, Classification>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(row)
    }

    pub async fn create_classification<'e, E>(
        &self,
        executor: E,
        kind: ClassificationKind,
        name: &str,
    ) -> Result<Classification, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("INSERT INTO {} (name) VALUES ($1) RETURNING *", kind.table());
        sqlx::query_as::<_, Classification>(&sql)
            .bind(name)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    return AppError::AlreadyExists(format!("{} '{}'", kind.display_name(), name));
                }
                e.into()
            })
    }

    pub async fn update_classification<'e, E>(
        &self,
        executor: E,
        kind: ClassificationKind,
        id: i64,
        name: &str,
        state: Lifecycle,
    ) -> Result<Option<Classification>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE {} SET name = $2, state = $3 WHERE id = $1 RETURNING *",
            kind.table()
        );
        sqlx::query_as::<_, Classification>(&sql)
            .bind(id)
            .bind(name)
            .bind(state)
            .fetch_optional(executor)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    return AppError::AlreadyExists(format!("{} '{}'", kind.display_name(), name));
                }
                e.into()
            })
    }

    pub async fn deactivate_classification<'e, E>(
        &self,
        executor: E,
        kind: ClassificationKind,
        id: i64,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("UPDATE {} SET state = 'INACTIVE' WHERE id = $1", kind.table());
        let result = sqlx::query(&sql).bind(id).execute(executor).await?;
        Ok(result.rows_affected() > 0)
    }

    // ---
    // Estoque
    // ---

    pub async fn list_stock(&self) -> Result<Vec<StockView>, AppError> {
        let sql = format!("{} ORDER BY p.name ASC, s.size ASC, s.color ASC", STOCK_VIEW_SELECT);
        let rows = sqlx::query_as::<_, StockView>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn list_stock_for_product(&self, product_id: i64) -> Result<Vec<StockView>, AppError> {
        let sql = format!(
            "{} WHERE s.product_id = $1 ORDER BY s.size ASC, s.color ASC",
            STOCK_VIEW_SELECT
        );
        let rows = sqlx::query_as::<_, StockView>(&sql)
            .bind(product_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Upsert: soma a quantidade na linha existente ou cria a linha.
    pub async fn add_stock<'e, E>(
        &self,
        executor: E,
        product_id: i64,
        size: ProductSize,
        color: ProductColor,
        quantity: i32,
    ) -> Result<StockEntry, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entry = sqlx::query_as::<_, StockEntry>(
            r#"
            INSERT INTO stock_entries (product_id, size, color, quantity)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (product_id, size, color)
            DO UPDATE SET quantity = stock_entries.quantity + EXCLUDED.quantity,
                          updated_at = NOW()
            RETURNING *
            "#,
        )
            .bind(product_id)
            .bind(size)
            .bind(color)
            .bind(quantity)
            .fetch_one(executor)
            .await?;
        Ok(entry)
    }

    pub async fn set_stock_quantity<'e, E>(
        &self,
        executor: E,
        id: i64,
        quantity: i32,
    ) -> Result<Option<StockEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entry = sqlx::query_as::<_, StockEntry>(
            "UPDATE stock_entries SET quantity = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
            .bind(id)
            .bind(quantity)
            .fetch_optional(executor)
            .await?;
        Ok(entry)
    }

    /// Baixa condicional e atômica. `None` = linha inexistente ou saldo insuficiente.
    pub async fn try_decrement_stock<'e, E>(
        &self,
        executor: E,
        product_id: i64,
        size: ProductSize,
        color: ProductColor,
        quantity: i32,
    ) -> Result<Option<i32>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let remaining = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE stock_entries
            SET quantity = quantity - $4, updated_at = NOW()
            WHERE product_id = $1 AND size = $2 AND color = $3 AND quantity >= $4
            RETURNING quantity
            "#,
        )
            .bind(product_id)
            .bind(size)
            .bind(color)
            .bind(quantity)
            .fetch_optional(executor)
            .await?;
        Ok(remaining)
    }

    pub async fn find_stock_quantity<'e, E>(
        &self,
        executor: E,
        product_id: i64,
        size: ProductSize,
        color: ProductColor,
    ) -> Result<Option<i32>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let quantity = sqlx::query_scalar::<_, i32>(
            "SELECT quantity FROM stock_entries WHERE product_id = $1 AND size = $2 AND color = $3",
        )
            .bind(product_id)
            .bind(size)
            .bind(color)
            .fetch_optional(executor)
            .await?;
        Ok(quantity)
    }
}

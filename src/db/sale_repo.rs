// src/db/sale_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres, QueryBuilder};

use crate::{
    common::error::AppError,
    models::sale::{
        PaymentMethod, Sale, SaleFigures, SaleHeaderRow, SaleLineItem, SaleLinePayload,
        SaleLineView,
    },
};

const SALE_HEADER_SELECT: &str = r#"
    SELECT s.*,
           c.name  AS customer_name,
           u.name  AS seller_name,
           u.email AS seller_email,
           pm.name AS payment_method_name,
           pm.kind AS payment_method_kind
    FROM sales s
    JOIN customers c        ON c.id = s.customer_id
    JOIN users u            ON u.id = s.seller_id
    JOIN payment_methods pm ON pm.id = s.payment_method_id
"#;

/// Quais vendas carregar com os dados anexados.
#[derive(Debug, Clone)]
pub enum SaleFilter {
    All,
    Id(i64),
    Seller(i64),
    Ids(Vec<i64>),
}

#[derive(Clone)]
pub struct SaleRepository {
    pool: PgPool,
}

impl SaleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Formas de pagamento
    // ---

    pub async fn list_payment_methods(&self) -> Result<Vec<PaymentMethod>, AppError> {
        let methods = sqlx::query_as::<_, PaymentMethod>("SELECT * FROM payment_methods ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(methods)
    }

    pub async fn find_payment_method<'e, E>(&self, executor: E, id: i64) -> Result<Option<PaymentMethod>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let method = sqlx::query_as::<_, PaymentMethod>("SELECT * FROM payment_methods WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(method)
    }

    // ---
    // Vendas
    // ---

    pub async fn insert_sale<'e, E>(
        &self,
        executor: E,
        seller_id: i64,
        customer_id: i64,
        payment_method_id: i64,
        figures: &SaleFigures,
        receipt_path: Option<&str>,
        notes: Option<&str>,
    ) -> Result<Sale, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            INSERT INTO sales (
                seller_id, customer_id, payment_method_id,
                cost, sale_price, profit, total, deposit, balance,
                discount, financed_discount, final_total,
                receipt_path, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING *
            "#,
        )
            .bind(seller_id)
            .bind(customer_id)
            .bind(payment_method_id)
            .bind(figures.cost)
            .bind(figures.sale_price)
            .bind(figures.profit)
            .bind(figures.total)
            .bind(figures.deposit)
            .bind(figures.balance)
            .bind(figures.discount)
            .bind(figures.financed_discount)
            .bind(figures.final_total)
            .bind(receipt_path)
            .bind(notes)
            .fetch_one(executor)
            .await?;
        Ok(sale)
    }

    pub async fn insert_line<'e, E>(
        &self,
        executor: E,
        sale_id: i64,
        line: &SaleLinePayload,
        subtotal: Decimal,
    ) -> Result<SaleLineItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, SaleLineItem>(
            r#"
            INSERT INTO sale_line_items (sale_id, product_id, size, color, quantity, unit_price, subtotal)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
            .bind(sale_id)
            .bind(line.product_id)
            .bind(line.size)
            .bind(line.color)
            .bind(line.quantity)
            .bind(line.unit_price)
            .bind(subtotal)
            .fetch_one(executor)
            .await?;
        Ok(item)
    }

    pub async fn find_sale<'e, E>(&self, executor: E, id: i64) -> Result<Option<Sale>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>("SELECT * FROM sales WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(sale)
    }

    /// Igual a `find_sale`, mas trava a linha até o fim da transação.
    pub async fn lock_sale<'e, E>(&self, executor: E, id: i64) -> Result<Option<Sale>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>("SELECT * FROM sales WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(sale)
    }

    pub async fn find_headers<'e, E>(&self, executor: E, filter: SaleFilter) -> Result<Vec<SaleHeaderRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new(SALE_HEADER_SELECT);
        match filter {
            SaleFilter::All => {}
            SaleFilter::Id(id) => {
                qb.push(" WHERE s.id = ").push_bind(id);
            }
            SaleFilter::Seller(seller_id) => {
                qb.push(" WHERE s.seller_id = ").push_bind(seller_id);
            }
            SaleFilter::Ids(ids) => {
                qb.push(" WHERE s.id = ANY(").push_bind(ids).push(")");
            }
        }
        qb.push(" ORDER BY s.created_at DESC, s.id DESC");

        let rows = qb
            .build_query_as::<SaleHeaderRow>()
            .fetch_all(executor)
            .await?;
        Ok(rows)
    }

    /// Itens (com nome do produto) de várias vendas de uma vez.
    pub async fn find_line_views<'e, E>(&self, executor: E, sale_ids: &[i64]) -> Result<Vec<SaleLineView>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lines = sqlx::query_as::<_, SaleLineView>(
            r#"
            SELECT li.*, p.name AS product_name
            FROM sale_line_items li
            JOIN products p ON p.id = li.product_id
            WHERE li.sale_id = ANY($1)
            ORDER BY li.sale_id ASC, li.id ASC
            "#,
        )
            .bind(sale_ids)
            .fetch_all(executor)
            .await?;
        Ok(lines)
    }

    pub async fn find_lines<'e, E>(&self, executor: E, sale_id: i64) -> Result<Vec<SaleLineItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lines = sqlx::query_as::<_, SaleLineItem>(
            "SELECT * FROM sale_line_items WHERE sale_id = $1 ORDER BY id ASC",
        )
            .bind(sale_id)
            .fetch_all(executor)
            .await?;
        Ok(lines)
    }

    /// Regrava os campos editáveis do cabeçalho (e os valores recalculados).
    pub async fn update_sale<'e, E>(&self, executor: E, sale: &Sale) -> Result<Sale, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let updated = sqlx::query_as::<_, Sale>(
            r#"
            UPDATE sales
            SET seller_id = $2, customer_id = $3, payment_method_id = $4,
                deposit = $5, balance = $6, discount = $7,
                financed_discount = $8, final_total = $9,
                notes = $10, receipt_path = $11
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(sale.id)
            .bind(sale.seller_id)
            .bind(sale.customer_id)
            .bind(sale.payment_method_id)
            .bind(sale.deposit)
            .bind(sale.balance)
            .bind(sale.discount)
            .bind(sale.financed_discount)
            .bind(sale.final_total)
            .bind(&sale.notes)
            .bind(&sale.receipt_path)
            .fetch_one(executor)
            .await?;
        Ok(updated)
    }

    pub async fn delete_lines<'e, E>(&self, executor: E, sale_id: i64) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM sale_line_items WHERE sale_id = $1")
            .bind(sale_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_sale<'e, E>(&self, executor: E, id: i64) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM sales WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

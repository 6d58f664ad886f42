// src/db/order_repo.rs

use sqlx::{Executor, PgPool, Postgres, QueryBuilder};

use crate::{
    common::error::AppError,
    models::order::{Order, OrderStatus},
};

#[derive(Debug, Clone, Copy)]
pub enum OrderFilter {
    All,
    Seller(i64),
    Status(OrderStatus),
}

#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Todo pedido nasce pendente.
    pub async fn create_for_sale<'e, E>(&self, executor: E, sale_id: i64) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(
            "INSERT INTO orders (sale_id, status) VALUES ($1, 'PENDING') RETURNING *",
        )
            .bind(sale_id)
            .fetch_one(executor)
            .await?;
        Ok(order)
    }

    pub async fn list(&self, filter: OrderFilter) -> Result<Vec<Order>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT o.* FROM orders o JOIN sales s ON s.id = o.sale_id",
        );
        match filter {
            OrderFilter::All => {}
            OrderFilter::Seller(seller_id) => {
                qb.push(" WHERE s.seller_id = ").push_bind(seller_id);
            }
            OrderFilter::Status(status) => {
                qb.push(" WHERE o.status = ").push_bind(status);
            }
        }
        qb.push(" ORDER BY o.created_at DESC, o.id DESC");

        let orders = qb.build_query_as::<Order>().fetch_all(&self.pool).await?;
        Ok(orders)
    }

    pub async fn find<'e, E>(&self, executor: E, id: i64) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(order)
    }

    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        id: i64,
        status: OrderStatus,
    ) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(
            "UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
            .bind(id)
            .bind(status)
            .fetch_optional(executor)
            .await?;
        Ok(order)
    }

    pub async fn delete_for_sale<'e, E>(&self, executor: E, sale_id: i64) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM orders WHERE sale_id = $1")
            .bind(sale_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}

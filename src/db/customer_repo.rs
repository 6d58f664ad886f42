// src/db/customer_repo.rs

use sqlx::{Executor, PgPool, Postgres};

use serde_json::json;

use crate::{
    common::{db_utils::is_foreign_key_violation, error::AppError},
    models::customer::{Customer, CustomerPayload, CustomerReferences},
};

#[derive(Clone)]
pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Customer>, AppError> {
        let customers = sqlx::query_as::<_, Customer>("SELECT * FROM customers ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(customers)
    }

    pub async fn find<'e, E>(&self, executor: E, id: i64) -> Result<Option<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(customer)
    }

    pub async fn create<'e, E>(&self, executor: E, payload: &CustomerPayload) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (name, phone, email, address, city, province, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
            .bind(&payload.name)
            .bind(&payload.phone)
            .bind(&payload.email)
            .bind(&payload.address)
            .bind(&payload.city)
            .bind(&payload.province)
            .bind(&payload.notes)
            .fetch_one(executor)
            .await?;
        Ok(customer)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: i64,
        payload: &CustomerPayload,
    ) -> Result<Option<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers
            SET name = $2, phone = $3, email = $4, address = $5,
                city = $6, province = $7, notes = $8
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(id)
            .bind(&payload.name)
            .bind(&payload.phone)
            .bind(&payload.email)
            .bind(&payload.address)
            .bind(&payload.city)
            .bind(&payload.province)
            .bind(&payload.notes)
            .fetch_optional(executor)
            .await?;
        Ok(customer)
    }

    /// Vendas, pedidos (via vendas) e gastos que ainda apontam para o cliente.
    pub async fn count_references<'e, E>(&self, executor: E, id: i64) -> Result<CustomerReferences, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let refs = sqlx::query_as::<_, CustomerReferences>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM sales WHERE customer_id = $1) AS sales,
                (SELECT COUNT(*) FROM orders o JOIN sales s ON s.id = o.sale_id
                  WHERE s.customer_id = $1) AS orders,
                (SELECT COUNT(*) FROM expenses WHERE client_id = $1) AS expenses
            "#,
        )
            .bind(id)
            .fetch_one(executor)
            .await?;
        Ok(refs)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: i64) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    return AppError::business(
                        "No se puede eliminar el cliente porque tiene registros asociados.",
                        json!({}),
                    );
                }
                AppError::from(e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}

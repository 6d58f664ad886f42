// src/db/commission_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::commission::{Commission, CommissionView, PeriodTotals},
};

const COMMISSION_VIEW_SELECT: &str = r#"
    SELECT c.*, u.name AS user_name
    FROM commissions c
    JOIN users u ON u.id = c.user_id
"#;

#[derive(Clone)]
pub struct CommissionRepository {
    pool: PgPool,
}

impl CommissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Soma de `final_total` das vendas do vendedor em [from, to).
    pub async fn period_totals<'e, E>(
        &self,
        executor: E,
        seller_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<PeriodTotals, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let totals = sqlx::query_as::<_, PeriodTotals>(
            r#"
            SELECT COALESCE(SUM(final_total), 0) AS total_sales,
                   COUNT(*) AS sales_count
            FROM sales
            WHERE seller_id = $1 AND created_at >= $2 AND created_at < $3
            "#,
        )
            .bind(seller_id)
            .bind(from)
            .bind(to)
            .fetch_one(executor)
            .await?;
        Ok(totals)
    }

    /// Idempotente por (user_id, month, year); as notas existentes são preservadas.
    pub async fn upsert<'e, E>(
        &self,
        executor: E,
        user_id: i64,
        month: i32,
        year: i32,
        total_sales: Decimal,
        net_commission: Decimal,
        base_salary: Decimal,
    ) -> Result<Commission, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let commission = sqlx::query_as::<_, Commission>(
            r#"
            INSERT INTO commissions (user_id, month, year, total_sales, net_commission, base_salary)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id, month, year)
            DO UPDATE SET total_sales = EXCLUDED.total_sales,
                          net_commission = EXCLUDED.net_commission,
                          base_salary = EXCLUDED.base_salary,
                          updated_at = NOW()
            RETURNING *
            "#,
        )
            .bind(user_id)
            .bind(month)
            .bind(year)
            .bind(total_sales)
            .bind(net_commission)
            .bind(base_salary)
            .fetch_one(executor)
            .await?;
        Ok(commission)
    }

    pub async fn find_for_period<'e, E>(
        &self,
        executor: E,
        user_id: i64,
        month: i32,
        year: i32,
    ) -> Result<Option<Commission>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let commission = sqlx::query_as::<_, Commission>(
            "SELECT * FROM commissions WHERE user_id = $1 AND month = $2 AND year = $3",
        )
            .bind(user_id)
            .bind(month)
            .bind(year)
            .fetch_optional(executor)
            .await?;
        Ok(commission)
    }

    /// Comissões de um usuário, período mais recente primeiro.
    pub async fn list_for_user(&self, user_id: i64, limit: Option<i64>) -> Result<Vec<Commission>, AppError> {
        let rows = sqlx::query_as::<_, Commission>(
            r#"
            SELECT * FROM commissions
            WHERE user_id = $1
            ORDER BY year DESC, month DESC
            LIMIT $2
            "#,
        )
            .bind(user_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn list_views(&self, user_id: Option<i64>) -> Result<Vec<CommissionView>, AppError> {
        let sql = format!(
            "{} WHERE ($1::BIGINT IS NULL OR c.user_id = $1) ORDER BY c.year DESC, c.month DESC, u.name ASC",
            COMMISSION_VIEW_SELECT
        );
        let rows = sqlx::query_as::<_, CommissionView>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn update_notes<'e, E>(&self, executor: E, id: i64, notes: &str) -> Result<Option<Commission>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let commission = sqlx::query_as::<_, Commission>(
            "UPDATE commissions SET notes = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
            .bind(id)
            .bind(notes)
            .fetch_optional(executor)
            .await?;
        Ok(commission)
    }
}

// src/db/expense_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres, QueryBuilder};

use crate::{
    common::{db_utils::is_foreign_key_violation, error::AppError, pagination::Page},
    models::expense::{CategoryTotal, Expense, ExpenseDraft, ExpenseFilter, MonthTotal},
};

// Filtros comuns à listagem e à contagem.
fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, client_id: i64, filter: &ExpenseFilter) {
    qb.push(" WHERE client_id = ").push_bind(client_id);
    if let Some(category) = filter.category {
        qb.push(" AND category = ").push_bind(category);
    }
    if let Some(from) = filter.date_from {
        qb.push(" AND date >= ").push_bind(from);
    }
    if let Some(to) = filter.date_to {
        qb.push(" AND date <= ").push_bind(to);
    }
    if let Some(provider) = filter.provider.as_deref().filter(|p| !p.trim().is_empty()) {
        qb.push(" AND provider ILIKE ").push_bind(format!("%{}%", provider.trim()));
    }
}

#[derive(Clone)]
pub struct ExpenseRepository {
    pool: PgPool,
}

impl ExpenseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        client_id: i64,
        user_id: i64,
        draft: &ExpenseDraft,
    ) -> Result<Expense, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Expense>(
            r#"
            INSERT INTO expenses (
                description, amount, date, category, provider,
                payment_method, receipt_number, notes, client_id, user_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
            .bind(&draft.description)
            .bind(draft.amount)
            .bind(draft.date)
            .bind(draft.category)
            .bind(&draft.provider)
            .bind(draft.payment_method)
            .bind(&draft.receipt_number)
            .bind(&draft.notes)
            .bind(client_id)
            .bind(user_id)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    return AppError::ReferenceNotFound("Cliente no encontrado.".to_string());
                }
                e.into()
            })
    }

    pub async fn find<'e, E>(&self, executor: E, client_id: i64, id: i64) -> Result<Option<Expense>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let expense = sqlx::query_as::<_, Expense>(
            "SELECT * FROM expenses WHERE id = $1 AND client_id = $2",
        )
            .bind(id)
            .bind(client_id)
            .fetch_optional(executor)
            .await?;
        Ok(expense)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        client_id: i64,
        id: i64,
        draft: &ExpenseDraft,
    ) -> Result<Option<Expense>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let expense = sqlx::query_as::<_, Expense>(
            r#"
            UPDATE expenses
            SET description = $3, amount = $4, date = $5, category = $6, provider = $7,
                payment_method = $8, receipt_number = $9, notes = $10, updated_at = NOW()
            WHERE id = $1 AND client_id = $2
            RETURNING *
            "#,
        )
            .bind(id)
            .bind(client_id)
            .bind(&draft.description)
            .bind(draft.amount)
            .bind(draft.date)
            .bind(draft.category)
            .bind(&draft.provider)
            .bind(draft.payment_method)
            .bind(&draft.receipt_number)
            .bind(&draft.notes)
            .fetch_optional(executor)
            .await?;
        Ok(expense)
    }

    pub async fn delete<'e, E>(&self, executor: E, client_id: i64, id: i64) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM expenses WHERE id = $1 AND client_id = $2")
            .bind(id)
            .bind(client_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Página de gastos + total de linhas que batem com o filtro.
    pub async fn list(
        &self,
        client_id: i64,
        filter: &ExpenseFilter,
        page: Page,
    ) -> Result<(Vec<Expense>, i64), AppError> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM expenses");
        push_filters(&mut count_qb, client_id, filter);
        let total: i64 = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM expenses");
        push_filters(&mut qb, client_id, filter);
        qb.push(" ORDER BY date DESC, id DESC LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset());
        let expenses = qb.build_query_as::<Expense>().fetch_all(&self.pool).await?;

        Ok((expenses, total))
    }

    pub async fn totals_by_category(
        &self,
        client_id: i64,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> Result<Vec<CategoryTotal>, AppError> {
        let rows = sqlx::query_as::<_, CategoryTotal>(
            r#"
            SELECT category, SUM(amount) AS total, COUNT(*) AS count
            FROM expenses
            WHERE client_id = $1
              AND ($2::DATE IS NULL OR date >= $2)
              AND ($3::DATE IS NULL OR date <= $3)
            GROUP BY category
            ORDER BY total DESC
            "#,
        )
            .bind(client_id)
            .bind(date_from)
            .bind(date_to)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn totals_by_month(&self, client_id: i64, year: i32) -> Result<Vec<MonthTotal>, AppError> {
        let rows = sqlx::query_as::<_, MonthTotal>(
            r#"
            SELECT EXTRACT(MONTH FROM date)::INT AS month,
                   SUM(amount) AS total,
                   COUNT(*) AS count
            FROM expenses
            WHERE client_id = $1 AND EXTRACT(YEAR FROM date)::INT = $2
            GROUP BY 1
            ORDER BY 1 ASC
            "#,
        )
            .bind(client_id)
            .bind(year)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn providers(&self, client_id: i64) -> Result<Vec<String>, AppError> {
        let rows = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT provider
            FROM expenses
            WHERE client_id = $1 AND provider IS NOT NULL AND provider <> ''
            ORDER BY provider ASC
            "#,
        )
            .bind(client_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

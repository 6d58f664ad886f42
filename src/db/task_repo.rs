// src/db/task_repo.rs

use sqlx::{Executor, PgPool, Postgres, QueryBuilder};

use crate::{
    common::error::AppError,
    models::task::{EmployeeTaskCounts, TaskFilter, TaskView},
};

#[derive(Clone)]
pub struct TaskRepository {
    pool: PgPool,
}

impl TaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        title: &str,
        description: Option<&str>,
        employee_id: i64,
        created_by: i64,
    ) -> Result<TaskView, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let task = sqlx::query_as::<_, TaskView>(
            r#"
            WITH inserted AS (
                INSERT INTO tasks (title, description, employee_id, created_by)
                VALUES ($1, $2, $3, $4)
                RETURNING *
            )
            SELECT inserted.*, u.name AS employee_name
            FROM inserted JOIN users u ON u.id = inserted.employee_id
            "#,
        )
            .bind(title)
            .bind(description)
            .bind(employee_id)
            .bind(created_by)
            .fetch_one(executor)
            .await?;
        Ok(task)
    }

    pub async fn find<'e, E>(&self, executor: E, id: i64) -> Result<Option<TaskView>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let task = sqlx::query_as::<_, TaskView>(
            r#"
            SELECT t.*, u.name AS employee_name
            FROM tasks t JOIN users u ON u.id = t.employee_id
            WHERE t.id = $1
            "#,
        )
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(task)
    }

    pub async fn list(&self, filter: &TaskFilter) -> Result<Vec<TaskView>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT t.*, u.name AS employee_name FROM tasks t JOIN users u ON u.id = t.employee_id WHERE TRUE",
        );
        if let Some(employee_id) = filter.employee_id {
            qb.push(" AND t.employee_id = ").push_bind(employee_id);
        }
        if let Some(completed) = filter.completed {
            qb.push(" AND t.completed = ").push_bind(completed);
        }
        qb.push(" ORDER BY t.created_at DESC, t.id DESC LIMIT ")
            .push_bind(filter.limit)
            .push(" OFFSET ")
            .push_bind(filter.offset);

        let tasks = qb.build_query_as::<TaskView>().fetch_all(&self.pool).await?;
        Ok(tasks)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: i64,
        title: &str,
        description: Option<&str>,
        completed: bool,
    ) -> Result<Option<TaskView>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let task = sqlx::query_as::<_, TaskView>(
            r#"
            WITH updated AS (
                UPDATE tasks
                SET title = $2, description = $3, completed = $4, updated_at = NOW()
                WHERE id = $1
                RETURNING *
            )
            SELECT updated.*, u.name AS employee_name
            FROM updated JOIN users u ON u.id = updated.employee_id
            "#,
        )
            .bind(id)
            .bind(title)
            .bind(description)
            .bind(completed)
            .fetch_optional(executor)
            .await?;
        Ok(task)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: i64) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Empregados com a contagem de tarefas pendentes e totais.
    pub async fn employee_task_counts(&self) -> Result<Vec<EmployeeTaskCounts>, AppError> {
        let rows = sqlx::query_as::<_, EmployeeTaskCounts>(
            r#"
            SELECT u.id, u.name, u.email,
                   COUNT(t.id) FILTER (WHERE NOT t.completed) AS pending_tasks,
                   COUNT(t.id) AS total_tasks
            FROM users u
            LEFT JOIN tasks t ON t.employee_id = u.id
            WHERE u.role = 'EMPLOYEE' AND u.active
            GROUP BY u.id, u.name, u.email
            ORDER BY u.name ASC
            "#,
        )
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

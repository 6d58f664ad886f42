// src/db/user_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::{db_utils::is_unique_violation, error::AppError},
    models::auth::{Role, User},
};

// O repositório de usuários, responsável por todas as interações com a tabela 'users'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca um usuário pelo seu e-mail
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_user)
    }

    // Busca um usuário pelo seu ID
    pub async fn find_by_id<'e, E>(&self, executor: E, id: i64) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let maybe_user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(maybe_user)
    }

    // Cria um novo usuário. E-mail duplicado vira EmailAlreadyExists.
    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        name: &str,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
            .bind(name)
            .bind(email)
            .bind(password_hash)
            .bind(role)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    return AppError::EmailAlreadyExists;
                }
                e.into()
            })
    }

    /// Todos os usuários com papel de empregado (ativos ou não).
    pub async fn list_employees(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE role = 'EMPLOYEE' ORDER BY name ASC",
        )
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    pub async fn list_active_employees<'e, E>(&self, executor: E) -> Result<Vec<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE role = 'EMPLOYEE' AND active ORDER BY id ASC",
        )
            .fetch_all(executor)
            .await?;
        Ok(users)
    }

    pub async fn update_commission_config<'e, E>(
        &self,
        executor: E,
        id: i64,
        commission_percentage: Decimal,
        advertising_expense: Decimal,
        base_salary: Decimal,
        notes: &str,
    ) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET commission_percentage = $2,
                advertising_expense = $3,
                base_salary = $4,
                commission_notes = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(id)
            .bind(commission_percentage)
            .bind(advertising_expense)
            .bind(base_salary)
            .bind(notes)
            .fetch_optional(executor)
            .await?;
        Ok(user)
    }
}

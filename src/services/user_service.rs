// src/services/user_service.rs

use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{common::error::AppError, db::UserRepository, models::auth::User};

#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    pool: PgPool,
}

impl UserService {
    pub fn new(user_repo: UserRepository, pool: PgPool) -> Self {
        Self { user_repo, pool }
    }

    pub async fn list_sellers(&self) -> Result<Vec<User>, AppError> {
        self.user_repo.list_employees().await
    }

    pub async fn update_commission_config(
        &self,
        user_id: i64,
        commission_percentage: Decimal,
        advertising_expense: Decimal,
        base_salary: Decimal,
        notes: &str,
    ) -> Result<User, AppError> {
        let user = self.user_repo
            .update_commission_config(
                &self.pool,
                user_id,
                commission_percentage,
                advertising_expense,
                base_salary,
                notes,
            )
            .await?
            .ok_or_else(|| AppError::NotFound("Usuario no encontrado.".to_string()))?;

        tracing::info!("Configuração de comissão atualizada para o usuário {}", user_id);
        Ok(user)
    }
}

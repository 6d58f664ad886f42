// src/services/customer_service.rs

use serde_json::json;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::CustomerRepository,
    models::customer::{Customer, CustomerPayload, CustomerReferences},
};

fn delete_blocked(refs: CustomerReferences) -> AppError {
    AppError::business(
        "No se puede eliminar el cliente porque tiene registros asociados.",
        json!({
            "sales": refs.sales,
            "orders": refs.orders,
            "expenses": refs.expenses,
        }),
    )
}

#[derive(Clone)]
pub struct CustomerService {
    customer_repo: CustomerRepository,
    pool: PgPool,
}

impl CustomerService {
    pub fn new(customer_repo: CustomerRepository, pool: PgPool) -> Self {
        Self { customer_repo, pool }
    }

    pub async fn list(&self) -> Result<Vec<Customer>, AppError> {
        self.customer_repo.list().await
    }

    pub async fn get(&self, id: i64) -> Result<Customer, AppError> {
        self.customer_repo
            .find(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Cliente no encontrado.".to_string()))
    }

    pub async fn create(&self, payload: &CustomerPayload) -> Result<Customer, AppError> {
        self.customer_repo.create(&self.pool, payload).await
    }

    pub async fn update(&self, id: i64, payload: &CustomerPayload) -> Result<Customer, AppError> {
        self.customer_repo
            .update(&self.pool, id, payload)
            .await?
            .ok_or_else(|| AppError::NotFound("Cliente no encontrado.".to_string()))
    }

    /// Só apaga clientes sem histórico financeiro.
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        if self.customer_repo.find(&mut *tx, id).await?.is_none() {
            return Err(AppError::NotFound("Cliente no encontrado.".to_string()));
        }

        let refs = self.customer_repo.count_references(&mut *tx, id).await?;
        if refs.is_referenced() {
            return Err(delete_blocked(refs));
        }

        match self.customer_repo.delete(&mut *tx, id).await {
            Ok(_) => {}
            // Venda gravada entre a contagem e o DELETE: reconta com o que já foi commitado.
            Err(AppError::BusinessRule { .. }) => {
                tx.rollback().await?;
                let refs = self.customer_repo.count_references(&self.pool, id).await?;
                return Err(delete_blocked(refs));
            }
            Err(e) => return Err(e),
        }
        tx.commit().await?;

        tracing::info!("Cliente {} removido", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocked_delete_reports_every_count() {
        let err = delete_blocked(CustomerReferences { sales: 2, orders: 2, expenses: 1 });
        match err {
            AppError::BusinessRule { details, .. } => {
                assert_eq!(details["sales"], 2);
                assert_eq!(details["orders"], 2);
                assert_eq!(details["expenses"], 1);
            }
            other => panic!("erro inesperado: {other:?}"),
        }
    }
}

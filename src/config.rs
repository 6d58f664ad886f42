// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        CatalogRepository, CommissionRepository, CustomerRepository, ExpenseRepository,
        OrderRepository, SaleRepository, TaskRepository, UserRepository,
    },
    services::{
        auth::{AuthService, TokenIssuer},
        catalog_service::CatalogService,
        commission_service::CommissionService,
        customer_service::CustomerService,
        expense_service::ExpenseService,
        order_service::OrderService,
        receipt_store::{LocalReceiptStore, ReceiptStore},
        sale_service::SaleService,
        task_service::TaskService,
        user_service::UserService,
    },
};

// Configuração lida do ambiente (e do .env, se existir).
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub port: u16,
    pub upload_dir: String,
    pub cors_origins: Vec<String>,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Mesma leitura de `from_env`, mas com a fonte de variáveis injetada.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let database_url = match lookup("DATABASE_URL") {
            Some(url) => url,
            None => format!(
                "postgres://{}:{}@{}:{}/{}",
                or_default("DB_USER", "postgres"),
                or_default("DB_PASSWORD", "postgres"),
                or_default("DB_HOST", "localhost"),
                or_default("DB_PORT", "5432"),
                or_default("DB_NAME", "vartan"),
            ),
        };

        let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let port = or_default("PORT", "8080")
            .parse::<u16>()
            .context("PORT inválida")?;
        let db_max_connections = or_default("DB_MAX_CONNECTIONS", "5")
            .parse::<u32>()
            .context("DB_MAX_CONNECTIONS inválido")?;

        let cors_origins = or_default("CORS_ORIGINS", "http://localhost:3000")
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        Ok(Self {
            database_url,
            db_max_connections,
            jwt_secret,
            port,
            upload_dir: or_default("UPLOAD_DIR", "uploads/comprobantes"),
            cors_origins,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub settings: Arc<Settings>,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub catalog_service: CatalogService,
    pub customer_service: CustomerService,
    pub sale_service: SaleService,
    pub order_service: OrderService,
    pub commission_service: CommissionService,
    pub task_service: TaskService,
    pub expense_service: ExpenseService,
}

impl AppState {
    pub async fn new(settings: Settings) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(settings.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&settings.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::with_pool(db_pool, settings))
    }

    /// Monta o gráfico de dependências sobre um pool já criado.
    pub fn with_pool(db_pool: PgPool, settings: Settings) -> Self {
        let receipts: Arc<dyn ReceiptStore> = Arc::new(LocalReceiptStore::new(settings.upload_dir.clone()));

        // --- Repositórios ---
        let user_repo = UserRepository::new(db_pool.clone());
        let catalog_repo = CatalogRepository::new(db_pool.clone());
        let customer_repo = CustomerRepository::new(db_pool.clone());
        let sale_repo = SaleRepository::new(db_pool.clone());
        let order_repo = OrderRepository::new(db_pool.clone());
        let commission_repo = CommissionRepository::new(db_pool.clone());
        let task_repo = TaskRepository::new(db_pool.clone());
        let expense_repo = ExpenseRepository::new(db_pool.clone());

        // --- Serviços ---
        let tokens = TokenIssuer::new(settings.jwt_secret.clone());
        let auth_service = AuthService::new(user_repo.clone(), tokens, db_pool.clone());
        let user_service = UserService::new(user_repo.clone(), db_pool.clone());
        let catalog_service = CatalogService::new(catalog_repo.clone(), db_pool.clone());
        let customer_service = CustomerService::new(customer_repo.clone(), db_pool.clone());
        let commission_service = CommissionService::new(commission_repo, user_repo.clone(), db_pool.clone());
        let sale_service = SaleService::new(
            sale_repo,
            catalog_repo,
            customer_repo,
            user_repo.clone(),
            order_repo.clone(),
            commission_service.clone(),
            receipts,
            db_pool.clone(),
        );
        let order_service = OrderService::new(order_repo, sale_service.clone(), db_pool.clone());
        let task_service = TaskService::new(task_repo, user_repo, db_pool.clone());
        let expense_service = ExpenseService::new(expense_repo, db_pool.clone());

        Self {
            db_pool,
            settings: Arc::new(settings),
            auth_service,
            user_service,
            catalog_service,
            customer_service,
            sale_service,
            order_service,
            commission_service,
            task_service,
            expense_service,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn discrete_db_variables_build_the_url() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("JWT_SECRET", "s3cret"),
            ("DB_HOST", "db"),
            ("DB_NAME", "tienda"),
        ]))
        .unwrap();

        assert_eq!(settings.database_url, "postgres://postgres:postgres@db:5432/tienda");
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.db_max_connections, 5);
        assert_eq!(settings.upload_dir, "uploads/comprobantes");
        assert_eq!(settings.cors_origins, vec!["http://localhost:3000".to_string()]);
    }

    #[test]
    fn database_url_wins_over_discrete_variables() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("JWT_SECRET", "s3cret"),
            ("DATABASE_URL", "postgres://u:p@h/x"),
            ("DB_HOST", "ignored"),
            ("CORS_ORIGINS", "http://a.test, http://b.test,"),
        ]))
        .unwrap();

        assert_eq!(settings.database_url, "postgres://u:p@h/x");
        assert_eq!(settings.cors_origins.len(), 2);
    }

    #[test]
    fn missing_secret_or_bad_port_fails() {
        assert!(Settings::from_lookup(lookup_from(&[])).is_err());
        assert!(Settings::from_lookup(lookup_from(&[("JWT_SECRET", "x"), ("PORT", "http")])).is_err());
    }
}

// src/db/seed.rs

use sqlx::PgPool;

use crate::models::sale::PaymentMethodKind;

const PRODUCT_TYPES: [&str; 5] = ["Camiseta", "Buzo", "Short", "Pantalón", "Remera"];
const TEAMS: [&str; 5] = ["River", "Boca", "AFA", "San Lorenzo", "Racing"];
const PAYMENT_METHODS: [(&str, PaymentMethodKind); 4] = [
    ("Financed Transfer", PaymentMethodKind::FinancedTransfer),
    ("Zero-Rate Transfer", PaymentMethodKind::ZeroRateTransfer),
    ("Bank Transfer", PaymentMethodKind::BankTransfer),
    ("Cash", PaymentMethodKind::Cash),
];

/// Dados de referência. Pode rodar a cada inicialização.
pub async fn run(pool: &PgPool) -> anyhow::Result<()> {
    let mut tx = pool.begin().await?;

    for name in PRODUCT_TYPES {
        sqlx::query("INSERT INTO product_types (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
            .bind(name)
            .execute(&mut *tx)
            .await?;
    }

    for name in TEAMS {
        sqlx::query("INSERT INTO teams (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
            .bind(name)
            .execute(&mut *tx)
            .await?;
    }

    for (name, kind) in PAYMENT_METHODS {
        sqlx::query("INSERT INTO payment_methods (name, kind) VALUES ($1, $2) ON CONFLICT DO NOTHING")
            .bind(name)
            .bind(kind)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    tracing::info!("🌱 Dados de referência conferidos (tipos, equipes, formas de pagamento).");
    Ok(())
}

// tests/sales_flow.rs
//
// Fluxos que dependem do Postgres: cada teste recebe um banco novo,
// já migrado, via `#[sqlx::test]` (requer DATABASE_URL).

use axum::http::StatusCode;
use rust_decimal::Decimal;
use sqlx::PgPool;

use vartan_backoffice::{
    common::error::AppError,
    config::{AppState, Settings},
    db::seed,
    models::{
        auth::{Caller, Role},
        catalog::{ProductColor, ProductSize},
        customer::CustomerPayload,
        sale::{CreateSalePayload, SaleLinePayload},
    },
    services::catalog_service::ProductInput,
};

struct Fixture {
    state: AppState,
    seller: Caller,
    customer_id: i64,
    product_id: i64,
    _uploads: tempfile::TempDir,
}

fn settings(upload_dir: &std::path::Path) -> Settings {
    Settings {
        database_url: String::new(),
        db_max_connections: 1,
        jwt_secret: "segredo-de-teste".to_string(),
        port: 0,
        upload_dir: upload_dir.to_string_lossy().into_owned(),
        cors_origins: Vec::new(),
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Empregada, cliente e um produto com 10 unidades em M/Azul e L/Azul.
async fn fixture(pool: PgPool) -> Fixture {
    seed::run(&pool).await.expect("seed");
    let uploads = tempfile::tempdir().expect("diretório temporário");
    let state = AppState::with_pool(pool, settings(uploads.path()));

    let user = state
        .auth_service
        .register_user("Lucía", "lucia@vartan.test", "secreta", "employee")
        .await
        .expect("empregada registrada");
    let seller = Caller { id: user.id, email: user.email.clone(), role: Role::Employee };

    let customer = state
        .customer_service
        .create(&CustomerPayload {
            name: "Martín Gómez".to_string(),
            phone: None,
            email: None,
            address: None,
            city: Some("Rosario".to_string()),
            province: None,
            notes: None,
        })
        .await
        .expect("cliente criado");

    let product = state
        .catalog_service
        .create_product(ProductInput {
            name: "Camiseta River 2025".to_string(),
            unit_cost: Decimal::new(50, 0),
            state: None,
            sizes: strings(&["M", "L"]),
            colors: strings(&["Azul"]),
            product_type_id: None,
            team_id: None,
        })
        .await
        .expect("produto criado");

    state
        .catalog_service
        .add_stock(product.id, &strings(&["M", "L"]), &strings(&["Azul"]), 10)
        .await
        .expect("estoque inicial");

    Fixture {
        state,
        seller,
        customer_id: customer.id,
        product_id: product.id,
        _uploads: uploads,
    }
}

async fn payment_method_id(pool: &PgPool, kind: &str) -> i64 {
    sqlx::query_scalar("SELECT id FROM payment_methods WHERE kind::text = $1")
        .bind(kind)
        .fetch_one(pool)
        .await
        .expect("forma de pagamento do seed")
}

async fn stock_of(pool: &PgPool, product_id: i64, size: &str) -> i32 {
    sqlx::query_scalar(
        "SELECT quantity FROM stock_entries WHERE product_id = $1 AND size::text = $2 AND color = 'AZUL'",
    )
    .bind(product_id)
    .bind(size)
    .fetch_one(pool)
    .await
    .expect("linha de estoque")
}

async fn count(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .expect("contagem")
}

fn line(product_id: i64, size: ProductSize, quantity: i32, unit_price: i64) -> SaleLinePayload {
    SaleLinePayload {
        product_id,
        size,
        color: ProductColor::Azul,
        quantity,
        unit_price: Decimal::new(unit_price, 0),
    }
}

fn sale(customer_id: i64, payment_method_id: i64, items: Vec<SaleLinePayload>) -> CreateSalePayload {
    CreateSalePayload {
        seller_id: None,
        customer_id,
        payment_method_id,
        sale_price: None,
        deposit: None,
        apply_financed_discount: false,
        notes: None,
        items,
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn financed_transfer_example_gets_three_percent_off_balance(pool: PgPool) {
    let fx = fixture(pool.clone()).await;
    let financed = payment_method_id(&pool, "FINANCED_TRANSFER").await;

    let mut payload = sale(
        fx.customer_id,
        financed,
        vec![line(fx.product_id, ProductSize::M, 2, 100), line(fx.product_id, ProductSize::L, 1, 50)],
    );
    payload.apply_financed_discount = true;

    let detail = fx.state.sale_service.create_sale(&fx.seller, payload, None).await.unwrap();

    assert_eq!(detail.sale.total, Decimal::new(250, 0));
    assert_eq!(detail.sale.balance, Decimal::new(250, 0));
    assert_eq!(detail.sale.discount, Decimal::new(750, 2));
    assert_eq!(detail.sale.final_total, Decimal::new(24250, 2));
    assert_eq!(detail.items.len(), 2);
    assert_eq!(stock_of(&pool, fx.product_id, "M").await, 8);
    assert_eq!(stock_of(&pool, fx.product_id, "L").await, 9);
    assert_eq!(count(&pool, "orders").await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn insufficient_stock_leaves_nothing_behind(pool: PgPool) {
    let fx = fixture(pool.clone()).await;
    let cash = payment_method_id(&pool, "CASH").await;

    let payload = sale(
        fx.customer_id,
        cash,
        vec![line(fx.product_id, ProductSize::M, 3, 100), line(fx.product_id, ProductSize::L, 50, 100)],
    );
    let err = fx.state.sale_service.create_sale(&fx.seller, payload, None).await.unwrap_err();

    match &err {
        AppError::BusinessRule { details, .. } => {
            assert_eq!(details["requested"], 50);
            assert_eq!(details["available"], 10);
        }
        other => panic!("erro inesperado: {other:?}"),
    }
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert_eq!(stock_of(&pool, fx.product_id, "M").await, 10);
    assert_eq!(stock_of(&pool, fx.product_id, "L").await, 10);
    assert_eq!(count(&pool, "sales").await, 0);
    assert_eq!(count(&pool, "sale_line_items").await, 0);
    assert_eq!(count(&pool, "orders").await, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn unknown_product_is_a_bad_request(pool: PgPool) {
    let fx = fixture(pool.clone()).await;
    let cash = payment_method_id(&pool, "CASH").await;

    let payload = sale(fx.customer_id, cash, vec![line(999_999, ProductSize::M, 1, 100)]);
    let err = fx.state.sale_service.create_sale(&fx.seller, payload, None).await.unwrap_err();

    assert!(matches!(err, AppError::BusinessRule { .. }), "erro inesperado: {err:?}");
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert_eq!(count(&pool, "sales").await, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn deleting_a_sale_restores_its_stock(pool: PgPool) {
    let fx = fixture(pool.clone()).await;
    let cash = payment_method_id(&pool, "CASH").await;

    let payload = sale(
        fx.customer_id,
        cash,
        vec![line(fx.product_id, ProductSize::M, 4, 100), line(fx.product_id, ProductSize::L, 2, 80)],
    );
    let detail = fx.state.sale_service.create_sale(&fx.seller, payload, None).await.unwrap();
    assert_eq!(stock_of(&pool, fx.product_id, "M").await, 6);
    assert_eq!(stock_of(&pool, fx.product_id, "L").await, 8);

    fx.state.sale_service.delete_sale(&fx.seller, detail.sale.id).await.unwrap();

    assert_eq!(stock_of(&pool, fx.product_id, "M").await, 10);
    assert_eq!(stock_of(&pool, fx.product_id, "L").await, 10);
    assert_eq!(count(&pool, "sales").await, 0);
    assert_eq!(count(&pool, "sale_line_items").await, 0);
    assert_eq!(count(&pool, "orders").await, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn recomputing_commissions_twice_keeps_one_row(pool: PgPool) {
    let fx = fixture(pool.clone()).await;
    let cash = payment_method_id(&pool, "CASH").await;

    let payload = sale(fx.customer_id, cash, vec![line(fx.product_id, ProductSize::M, 4, 100)]);
    fx.state.sale_service.create_sale(&fx.seller, payload, None).await.unwrap();

    let first = fx.state.commission_service.recompute_current_period().await.unwrap();
    let second = fx.state.commission_service.recompute_current_period().await.unwrap();

    let mine = |rows: &[vartan_backoffice::models::commission::Commission]| {
        rows.iter()
            .find(|c| c.user_id == fx.seller.id)
            .map(|c| (c.id, c.total_sales, c.net_commission))
            .expect("linha da empregada")
    };
    assert_eq!(mine(&first), mine(&second));
    // 10% padrão sobre 400, sem gasto de publicidade
    assert_eq!(mine(&second).1, Decimal::new(400, 0));
    assert_eq!(mine(&second).2, Decimal::new(40, 0));

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM commissions WHERE user_id = $1")
        .bind(fx.seller.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn customer_with_sales_cannot_be_deleted(pool: PgPool) {
    let fx = fixture(pool.clone()).await;
    let cash = payment_method_id(&pool, "CASH").await;

    let payload = sale(fx.customer_id, cash, vec![line(fx.product_id, ProductSize::M, 1, 100)]);
    fx.state.sale_service.create_sale(&fx.seller, payload, None).await.unwrap();

    let err = fx.state.customer_service.delete(fx.customer_id).await.unwrap_err();
    match &err {
        AppError::BusinessRule { details, .. } => {
            assert_eq!(details["sales"], 1);
            assert_eq!(details["orders"], 1);
            assert_eq!(details["expenses"], 0);
        }
        other => panic!("erro inesperado: {other:?}"),
    }
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert!(fx.state.customer_service.get(fx.customer_id).await.is_ok());
}

#[sqlx::test(migrations = "./migrations")]
async fn adding_stock_twice_accumulates_in_one_row(pool: PgPool) {
    let fx = fixture(pool.clone()).await;

    let product = fx
        .state
        .catalog_service
        .create_product(ProductInput {
            name: "Buzo Boca".to_string(),
            unit_cost: Decimal::new(80, 0),
            state: None,
            sizes: strings(&["M"]),
            colors: strings(&["Azul"]),
            product_type_id: None,
            team_id: None,
        })
        .await
        .unwrap();

    for _ in 0..2 {
        fx.state
            .catalog_service
            .add_stock(product.id, &strings(&["M"]), &strings(&["Azul"]), 10)
            .await
            .unwrap();
    }

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stock_entries WHERE product_id = $1")
        .bind(product.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, 1);
    assert_eq!(stock_of(&pool, product.id, "M").await, 20);
}

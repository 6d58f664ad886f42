// src/routes.rs

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware as axum_middleware,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::AppState,
    docs::ApiDoc,
    handlers,
    middleware::auth::{auth_guard, owner_guard},
    services::receipt_store::MAX_RECEIPT_BYTES,
};

// Comprovante de até 5MB + campos de texto do formulário.
const UPLOAD_BODY_LIMIT: usize = MAX_RECEIPT_BYTES + 1024 * 1024;

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

pub fn app_router(app_state: AppState) -> Router {
    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Só o dono
    let owner_routes = Router::new()
        .route("/users/sellers", get(handlers::users::list_sellers))
        .route("/users/{id}/commission-config", put(handlers::users::update_commission_config))
        .route("/products", post(handlers::catalog::create_product))
        .route(
            "/products/{id}",
            put(handlers::catalog::update_product).delete(handlers::catalog::delete_product),
        )
        .route("/product-types", post(handlers::catalog::create_product_type))
        .route(
            "/product-types/{id}",
            put(handlers::catalog::update_product_type).delete(handlers::catalog::delete_product_type),
        )
        .route("/teams", post(handlers::catalog::create_team))
        .route(
            "/teams/{id}",
            put(handlers::catalog::update_team).delete(handlers::catalog::delete_team),
        )
        .route("/stock", post(handlers::catalog::add_stock))
        .route("/stock/{id}", put(handlers::catalog::set_stock))
        .route("/ventas", get(handlers::sales::list_all_sales))
        .route("/ventas/user/{id}", get(handlers::sales::list_sales_by_user))
        .route("/pedidos", get(handlers::orders::list_all_orders))
        .route("/pedidos/status/{status}", get(handlers::orders::list_orders_by_status))
        .route("/comisiones", get(handlers::commissions::list_all_commissions))
        .route("/comisiones/user/{id}", get(handlers::commissions::list_user_commissions))
        .route("/comisiones/calcular", post(handlers::commissions::recompute_commissions))
        .route("/comisiones/{id}/notes", put(handlers::commissions::update_commission_notes))
        .layer(axum_middleware::from_fn(owner_guard));

    // Qualquer usuário autenticado
    let api_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        // Catálogo
        .route("/products", get(handlers::catalog::list_products))
        .route("/products/{id}", get(handlers::catalog::get_product))
        .route("/product-types", get(handlers::catalog::list_product_types))
        .route("/product-types/{id}", get(handlers::catalog::get_product_type))
        .route("/teams", get(handlers::catalog::list_teams))
        .route("/teams/{id}", get(handlers::catalog::get_team))
        .route("/stock", get(handlers::catalog::list_stock))
        .route("/stock/product/{id}", get(handlers::catalog::stock_for_product))
        // Clientes
        .route(
            "/clientes",
            get(handlers::customers::list_customers).post(handlers::customers::create_customer),
        )
        .route(
            "/clientes/{id}",
            get(handlers::customers::get_customer)
                .put(handlers::customers::update_customer)
                .delete(handlers::customers::delete_customer),
        )
        // Vendas
        .route("/payment-methods", get(handlers::sales::list_payment_methods))
        .route("/mis-ventas", get(handlers::sales::list_my_sales))
        .route(
            "/ventas",
            post(handlers::sales::create_sale).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route(
            "/ventas/{id}",
            get(handlers::sales::get_sale)
                .put(handlers::sales::update_sale)
                .delete(handlers::sales::delete_sale),
        )
        .route(
            "/ventas/{id}/pago",
            put(handlers::sales::update_payment).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route(
            "/ventas/{id}/comprobante",
            get(handlers::sales::download_receipt).delete(handlers::sales::delete_receipt),
        )
        // Pedidos
        .route("/mis-pedidos", get(handlers::orders::list_my_orders))
        .route("/pedidos/{id}", put(handlers::orders::update_order_status))
        // Comissões
        .route("/mis-comisiones", get(handlers::commissions::list_my_commissions))
        .route("/mi-resumen-comision", get(handlers::commissions::my_commission_summary))
        // Tarefas
        .route(
            "/tareas",
            get(handlers::tasks::list_tasks).post(handlers::tasks::create_task),
        )
        .route(
            "/tareas/{id}",
            get(handlers::tasks::get_task)
                .patch(handlers::tasks::update_task)
                .delete(handlers::tasks::delete_task),
        )
        .route("/empleados", get(handlers::tasks::list_employees))
        // Gastos
        .route(
            "/gastos",
            get(handlers::expenses::list_expenses).post(handlers::expenses::create_expense),
        )
        .route("/gastos/resumen", get(handlers::expenses::expense_summary))
        .route("/gastos/por-mes", get(handlers::expenses::expenses_by_month))
        .route("/gastos/proveedores", get(handlers::expenses::list_providers))
        .route(
            "/gastos/{id}",
            get(handlers::expenses::get_expense)
                .put(handlers::expenses::update_expense)
                .delete(handlers::expenses::delete_expense),
        )
        .nest("/owner", owner_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    Router::new()
        .route("/health", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/auth", auth_routes)
        .nest("/api", api_routes)
        .layer(cors_layer(&app_state.settings.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

// src/handlers/customers.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::{error::AppError, extract::ApiJson},
    config::AppState,
    models::customer::{Customer, CustomerPayload},
};

#[utoipa::path(
    get,
    path = "/api/clientes",
    tag = "Customers",
    responses((status = 200, description = "Clientes por nome", body = Vec<Customer>)),
    security(("api_jwt" = []))
)]
pub async fn list_customers(State(app_state): State<AppState>) -> Result<Json<Vec<Customer>>, AppError> {
    Ok(Json(app_state.customer_service.list().await?))
}

#[utoipa::path(
    get,
    path = "/api/clientes/{id}",
    tag = "Customers",
    responses(
        (status = 200, description = "Cliente", body = Customer),
        (status = 404, description = "Cliente não encontrado")
    ),
    params(("id" = i64, Path, description = "ID do cliente")),
    security(("api_jwt" = []))
)]
pub async fn get_customer(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Customer>, AppError> {
    Ok(Json(app_state.customer_service.get(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/clientes",
    tag = "Customers",
    request_body = CustomerPayload,
    responses((status = 201, description = "Cliente criado", body = Customer)),
    security(("api_jwt" = []))
)]
pub async fn create_customer(
    State(app_state): State<AppState>,
    ApiJson(payload): ApiJson<CustomerPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let customer = app_state.customer_service.create(&payload).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

#[utoipa::path(
    put,
    path = "/api/clientes/{id}",
    tag = "Customers",
    request_body = CustomerPayload,
    responses(
        (status = 200, description = "Cliente atualizado", body = Customer),
        (status = 404, description = "Cliente não encontrado")
    ),
    params(("id" = i64, Path, description = "ID do cliente")),
    security(("api_jwt" = []))
)]
pub async fn update_customer(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<CustomerPayload>,
) -> Result<Json<Customer>, AppError> {
    payload.validate()?;
    Ok(Json(app_state.customer_service.update(id, &payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/clientes/{id}",
    tag = "Customers",
    responses(
        (status = 204, description = "Cliente removido"),
        (status = 400, description = "Cliente com vendas, pedidos ou gastos associados"),
        (status = 404, description = "Cliente não encontrado")
    ),
    params(("id" = i64, Path, description = "ID do cliente")),
    security(("api_jwt" = []))
)]
pub async fn delete_customer(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    app_state.customer_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// src/handlers/orders.rs

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    common::{error::AppError, extract::ApiJson},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::order::{OrderStatus, OrderView},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusPayload {
    /// pending | dispatched | cancelled
    pub status: String,
}

#[utoipa::path(
    get,
    path = "/api/mis-pedidos",
    tag = "Orders",
    responses((status = 200, description = "Pedidos das vendas do usuário", body = Vec<OrderView>)),
    security(("api_jwt" = []))
)]
pub async fn list_my_orders(
    State(app_state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
) -> Result<Json<Vec<OrderView>>, AppError> {
    Ok(Json(app_state.order_service.list_mine(&caller).await?))
}

#[utoipa::path(
    get,
    path = "/api/owner/pedidos",
    tag = "Orders",
    responses((status = 200, description = "Todos os pedidos", body = Vec<OrderView>)),
    security(("api_jwt" = []))
)]
pub async fn list_all_orders(State(app_state): State<AppState>) -> Result<Json<Vec<OrderView>>, AppError> {
    Ok(Json(app_state.order_service.list_all().await?))
}

#[utoipa::path(
    get,
    path = "/api/owner/pedidos/status/{status}",
    tag = "Orders",
    responses(
        (status = 200, description = "Pedidos num estado", body = Vec<OrderView>),
        (status = 400, description = "Estado desconhecido")
    ),
    params(("status" = String, Path, description = "pending | dispatched | cancelled")),
    security(("api_jwt" = []))
)]
pub async fn list_orders_by_status(
    State(app_state): State<AppState>,
    Path(status): Path<String>,
) -> Result<Json<Vec<OrderView>>, AppError> {
    Ok(Json(app_state.order_service.list_by_status(&status).await?))
}

#[utoipa::path(
    put,
    path = "/api/pedidos/{id}",
    tag = "Orders",
    request_body = UpdateOrderStatusPayload,
    responses(
        (status = 200, description = "Estado atualizado", body = OrderView),
        (status = 400, description = "Estado desconhecido"),
        (status = 404, description = "Pedido não encontrado")
    ),
    params(("id" = i64, Path, description = "ID do pedido")),
    security(("api_jwt" = []))
)]
pub async fn update_order_status(
    State(app_state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<UpdateOrderStatusPayload>,
) -> Result<Json<OrderView>, AppError> {
    let status = OrderStatus::parse(&payload.status).ok_or_else(|| {
        AppError::BadRequest(format!("Estado de pedido inválido: {}", payload.status))
    })?;
    Ok(Json(app_state.order_service.update_status(&caller, id, status).await?))
}

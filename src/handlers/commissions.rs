// src/handlers/commissions.rs

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::{error::AppError, extract::ApiJson},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::commission::{Commission, CommissionSummary, CommissionView},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CommissionNotesPayload {
    #[validate(length(max = 2000, message = "Las notas no pueden superar 2000 caracteres."))]
    pub notes: String,
}

#[utoipa::path(
    get,
    path = "/api/mis-comisiones",
    tag = "Commissions",
    responses((status = 200, description = "Comissões do usuário, período mais recente primeiro", body = Vec<Commission>)),
    security(("api_jwt" = []))
)]
pub async fn list_my_commissions(
    State(app_state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
) -> Result<Json<Vec<Commission>>, AppError> {
    Ok(Json(app_state.commission_service.list_for_user(caller.id).await?))
}

#[utoipa::path(
    get,
    path = "/api/mi-resumen-comision",
    tag = "Commissions",
    responses((status = 200, description = "Resumo ao vivo do mês corrente", body = CommissionSummary)),
    security(("api_jwt" = []))
)]
pub async fn my_commission_summary(
    State(app_state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
) -> Result<Json<CommissionSummary>, AppError> {
    Ok(Json(app_state.commission_service.live_summary(caller.id).await?))
}

#[utoipa::path(
    get,
    path = "/api/owner/comisiones",
    tag = "Commissions",
    responses((status = 200, description = "Todas as comissões", body = Vec<CommissionView>)),
    security(("api_jwt" = []))
)]
pub async fn list_all_commissions(State(app_state): State<AppState>) -> Result<Json<Vec<CommissionView>>, AppError> {
    Ok(Json(app_state.commission_service.list_views(None).await?))
}

#[utoipa::path(
    get,
    path = "/api/owner/comisiones/user/{id}",
    tag = "Commissions",
    responses((status = 200, description = "Comissões de um vendedor", body = Vec<CommissionView>)),
    params(("id" = i64, Path, description = "ID do usuário")),
    security(("api_jwt" = []))
)]
pub async fn list_user_commissions(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<CommissionView>>, AppError> {
    Ok(Json(app_state.commission_service.list_views(Some(id)).await?))
}

#[utoipa::path(
    post,
    path = "/api/owner/comisiones/calcular",
    tag = "Commissions",
    responses((status = 200, description = "Comissões do mês corrente recalculadas", body = Vec<Commission>)),
    security(("api_jwt" = []))
)]
pub async fn recompute_commissions(State(app_state): State<AppState>) -> Result<Json<Vec<Commission>>, AppError> {
    Ok(Json(app_state.commission_service.recompute_current_period().await?))
}

#[utoipa::path(
    put,
    path = "/api/owner/comisiones/{id}/notes",
    tag = "Commissions",
    request_body = CommissionNotesPayload,
    responses(
        (status = 200, description = "Notas atualizadas", body = Commission),
        (status = 404, description = "Comissão não encontrada")
    ),
    params(("id" = i64, Path, description = "ID da comissão")),
    security(("api_jwt" = []))
)]
pub async fn update_commission_notes(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<CommissionNotesPayload>,
) -> Result<Json<Commission>, AppError> {
    payload.validate()?;
    Ok(Json(app_state.commission_service.update_notes(id, &payload.notes).await?))
}

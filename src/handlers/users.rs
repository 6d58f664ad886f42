// src/handlers/users.rs

use axum::{
    extract::{Path, State},
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        extract::ApiJson,
        validation::{validate_not_negative, validate_percentage},
    },
    config::AppState,
    models::auth::User,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommissionConfigPayload {
    #[validate(custom(function = "validate_percentage"))]
    pub commission_percentage: Decimal,
    #[validate(custom(function = "validate_not_negative"))]
    pub advertising_expense: Decimal,
    #[validate(custom(function = "validate_not_negative"))]
    pub base_salary: Decimal,
    #[serde(default)]
    pub notes: String,
}

#[utoipa::path(
    get,
    path = "/api/owner/users/sellers",
    tag = "Users",
    responses(
        (status = 200, description = "Empregados", body = Vec<User>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_sellers(State(app_state): State<AppState>) -> Result<Json<Vec<User>>, AppError> {
    let sellers = app_state.user_service.list_sellers().await?;
    Ok(Json(sellers))
}

#[utoipa::path(
    put,
    path = "/api/owner/users/{id}/commission-config",
    tag = "Users",
    request_body = CommissionConfigPayload,
    responses(
        (status = 200, description = "Configuração de comissão atualizada", body = User),
        (status = 404, description = "Usuário não encontrado")
    ),
    params(
        ("id" = i64, Path, description = "ID do usuário")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_commission_config(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<CommissionConfigPayload>,
) -> Result<Json<User>, AppError> {
    payload.validate()?;

    let user = app_state
        .user_service
        .update_commission_config(
            id,
            payload.commission_percentage,
            payload.advertising_expense,
            payload.base_salary,
            &payload.notes,
        )
        .await?;
    Ok(Json(user))
}

// src/handlers/expenses.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    common::{error::AppError, extract::ApiJson, pagination::Page, validation::validate_positive},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::expense::{
        Expense, ExpenseCategory, ExpenseFilter, ExpensePage, ExpensePaymentMethod, ExpenseSummary,
        MonthTotal,
    },
    services::expense_service::{parse_expense_date, ExpenseInput},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpensePayload {
    /// Cliente dono do gasto.
    pub client_id: i64,
    #[validate(length(min = 1, max = 255, message = "La descripción es obligatoria."))]
    pub description: String,
    #[validate(custom(function = "validate_positive"))]
    pub amount: Decimal,
    /// YYYY-MM-DD
    pub date: String,
    pub category: ExpenseCategory,
    #[validate(length(max = 150))]
    pub provider: Option<String>,
    pub payment_method: Option<ExpensePaymentMethod>,
    #[validate(length(max = 100))]
    pub receipt_number: Option<String>,
    pub notes: Option<String>,
}

impl ExpensePayload {
    fn into_parts(self) -> (i64, ExpenseInput) {
        (
            self.client_id,
            ExpenseInput {
                description: self.description,
                amount: self.amount,
                date: self.date,
                category: self.category,
                provider: self.provider,
                payment_method: self.payment_method,
                receipt_number: self.receipt_number,
                notes: self.notes,
            },
        )
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ClientScope {
    pub client_id: i64,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExpenseListQuery {
    pub client_id: i64,
    pub category: Option<ExpenseCategory>,
    /// YYYY-MM-DD
    pub date_from: Option<String>,
    /// YYYY-MM-DD
    pub date_to: Option<String>,
    pub provider: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExpenseSummaryQuery {
    pub client_id: i64,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExpenseYearQuery {
    pub client_id: i64,
    /// Padrão: ano corrente
    pub year: Option<i32>,
}

fn optional_date(raw: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    raw.filter(|d| !d.trim().is_empty())
        .map(parse_expense_date)
        .transpose()
}

#[utoipa::path(
    post,
    path = "/api/gastos",
    tag = "Expenses",
    request_body = ExpensePayload,
    responses(
        (status = 201, description = "Gasto registrado", body = Expense),
        (status = 400, description = "Dados inválidos ou cliente inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_expense(
    State(app_state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    ApiJson(payload): ApiJson<ExpensePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let (client_id, input) = payload.into_parts();
    let expense = app_state.expense_service.create(&caller, client_id, input).await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

#[utoipa::path(
    get,
    path = "/api/gastos",
    tag = "Expenses",
    params(ExpenseListQuery),
    responses((status = 200, description = "Página de gastos", body = ExpensePage)),
    security(("api_jwt" = []))
)]
pub async fn list_expenses(
    State(app_state): State<AppState>,
    Query(query): Query<ExpenseListQuery>,
) -> Result<Json<ExpensePage>, AppError> {
    let filter = ExpenseFilter {
        category: query.category,
        date_from: optional_date(query.date_from.as_deref())?,
        date_to: optional_date(query.date_to.as_deref())?,
        provider: query.provider,
    };
    let page = Page::new(query.page, query.limit);
    Ok(Json(app_state.expense_service.list(query.client_id, &filter, page).await?))
}

#[utoipa::path(
    get,
    path = "/api/gastos/{id}",
    tag = "Expenses",
    params(("id" = i64, Path, description = "ID do gasto"), ClientScope),
    responses(
        (status = 200, description = "Gasto", body = Expense),
        (status = 404, description = "Gasto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_expense(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Query(scope): Query<ClientScope>,
) -> Result<Json<Expense>, AppError> {
    Ok(Json(app_state.expense_service.get(scope.client_id, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/gastos/{id}",
    tag = "Expenses",
    request_body = ExpensePayload,
    params(("id" = i64, Path, description = "ID do gasto")),
    responses(
        (status = 200, description = "Gasto atualizado", body = Expense),
        (status = 404, description = "Gasto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_expense(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<ExpensePayload>,
) -> Result<Json<Expense>, AppError> {
    payload.validate()?;
    let (client_id, input) = payload.into_parts();
    Ok(Json(app_state.expense_service.update(client_id, id, input).await?))
}

#[utoipa::path(
    delete,
    path = "/api/gastos/{id}",
    tag = "Expenses",
    params(("id" = i64, Path, description = "ID do gasto"), ClientScope),
    responses(
        (status = 204, description = "Gasto removido"),
        (status = 404, description = "Gasto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_expense(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Query(scope): Query<ClientScope>,
) -> Result<StatusCode, AppError> {
    app_state.expense_service.delete(scope.client_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/gastos/resumen",
    tag = "Expenses",
    params(ExpenseSummaryQuery),
    responses((status = 200, description = "Totais por categoria", body = ExpenseSummary)),
    security(("api_jwt" = []))
)]
pub async fn expense_summary(
    State(app_state): State<AppState>,
    Query(query): Query<ExpenseSummaryQuery>,
) -> Result<Json<ExpenseSummary>, AppError> {
    let summary = app_state
        .expense_service
        .summary(
            query.client_id,
            optional_date(query.date_from.as_deref())?,
            optional_date(query.date_to.as_deref())?,
        )
        .await?;
    Ok(Json(summary))
}

#[utoipa::path(
    get,
    path = "/api/gastos/por-mes",
    tag = "Expenses",
    params(ExpenseYearQuery),
    responses((status = 200, description = "Totais por mês do ano", body = Vec<MonthTotal>)),
    security(("api_jwt" = []))
)]
pub async fn expenses_by_month(
    State(app_state): State<AppState>,
    Query(query): Query<ExpenseYearQuery>,
) -> Result<Json<Vec<MonthTotal>>, AppError> {
    Ok(Json(app_state.expense_service.by_month(query.client_id, query.year).await?))
}

#[utoipa::path(
    get,
    path = "/api/gastos/proveedores",
    tag = "Expenses",
    params(ClientScope),
    responses((status = 200, description = "Fornecedores distintos", body = Vec<String>)),
    security(("api_jwt" = []))
)]
pub async fn list_providers(
    State(app_state): State<AppState>,
    Query(scope): Query<ClientScope>,
) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(app_state.expense_service.providers(scope.client_id).await?))
}

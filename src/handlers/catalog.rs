// src/handlers/catalog.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::{error::AppError, extract::ApiJson, validation::validate_not_negative},
    config::AppState,
    models::catalog::{Classification, ClassificationKind, Lifecycle, Product, StockEntry, StockView},
    services::catalog_service::ProductInput,
};

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    #[validate(length(min = 1, max = 150, message = "El nombre es obligatorio."))]
    pub name: String,
    #[validate(custom(function = "validate_not_negative"))]
    pub unit_cost: Decimal,
    pub state: Option<Lifecycle>,
    /// Talles: S, M, L, XL, XXL
    #[serde(default)]
    pub sizes: Vec<String>,
    /// Colores: Blanco, Negro, Azul, ...
    #[serde(default)]
    pub colors: Vec<String>,
    pub product_type_id: Option<i64>,
    pub team_id: Option<i64>,
}

impl From<ProductPayload> for ProductInput {
    fn from(payload: ProductPayload) -> Self {
        Self {
            name: payload.name,
            unit_cost: payload.unit_cost,
            state: payload.state,
            sizes: payload.sizes,
            colors: payload.colors,
            product_type_id: payload.product_type_id,
            team_id: payload.team_id,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateClassificationPayload {
    #[validate(length(min = 1, max = 100, message = "El nombre es obligatorio."))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateClassificationPayload {
    #[validate(length(min = 1, max = 100, message = "El nombre no puede estar vacío."))]
    pub name: Option<String>,
    pub state: Option<Lifecycle>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddStockPayload {
    pub product_id: i64,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    #[validate(range(min = 1, message = "La cantidad debe ser al menos 1."))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SetStockPayload {
    #[validate(range(min = 0, message = "La cantidad no puede ser negativa."))]
    pub quantity: i32,
}

// ---
// Produtos
// ---

#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Catalog",
    responses((status = 200, description = "Produtos ativos", body = Vec<Product>)),
    security(("api_jwt" = []))
)]
pub async fn list_products(State(app_state): State<AppState>) -> Result<Json<Vec<Product>>, AppError> {
    Ok(Json(app_state.catalog_service.list_products().await?))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "Catalog",
    responses(
        (status = 200, description = "Produto", body = Product),
        (status = 404, description = "Produto não encontrado")
    ),
    params(("id" = i64, Path, description = "ID do produto")),
    security(("api_jwt" = []))
)]
pub async fn get_product(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Product>, AppError> {
    Ok(Json(app_state.catalog_service.get_product(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/owner/products",
    tag = "Catalog",
    request_body = ProductPayload,
    responses(
        (status = 201, description = "Produto criado", body = Product),
        (status = 400, description = "Talles/cores inválidos ou referência inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    ApiJson(payload): ApiJson<ProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let product = app_state.catalog_service.create_product(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

#[utoipa::path(
    put,
    path = "/api/owner/products/{id}",
    tag = "Catalog",
    request_body = ProductPayload,
    responses(
        (status = 200, description = "Produto atualizado", body = Product),
        (status = 404, description = "Produto não encontrado")
    ),
    params(("id" = i64, Path, description = "ID do produto")),
    security(("api_jwt" = []))
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<ProductPayload>,
) -> Result<Json<Product>, AppError> {
    payload.validate()?;
    let product = app_state.catalog_service.update_product(id, payload.into()).await?;
    Ok(Json(product))
}

#[utoipa::path(
    delete,
    path = "/api/owner/products/{id}",
    tag = "Catalog",
    responses(
        (status = 204, description = "Produto desativado"),
        (status = 404, description = "Produto não encontrado")
    ),
    params(("id" = i64, Path, description = "ID do produto")),
    security(("api_jwt" = []))
)]
pub async fn delete_product(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    app_state.catalog_service.deactivate_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Tipos de produto e equipes (mesmo formato, tabelas diferentes)
// ---

async fn create_classification(
    app_state: &AppState,
    kind: ClassificationKind,
    payload: CreateClassificationPayload,
) -> Result<(StatusCode, Json<Classification>), AppError> {
    payload.validate()?;
    let created = app_state
        .catalog_service
        .create_classification(kind, &payload.name)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_classification(
    app_state: &AppState,
    kind: ClassificationKind,
    id: i64,
    payload: UpdateClassificationPayload,
) -> Result<Json<Classification>, AppError> {
    payload.validate()?;
    let updated = app_state
        .catalog_service
        .update_classification(kind, id, payload.name.as_deref(), payload.state)
        .await?;
    Ok(Json(updated))
}

#[utoipa::path(
    get,
    path = "/api/product-types",
    tag = "Catalog",
    responses((status = 200, description = "Tipos de produto ativos", body = Vec<Classification>)),
    security(("api_jwt" = []))
)]
pub async fn list_product_types(State(app_state): State<AppState>) -> Result<Json<Vec<Classification>>, AppError> {
    let items = app_state
        .catalog_service
        .list_classifications(ClassificationKind::ProductType)
        .await?;
    Ok(Json(items))
}

#[utoipa::path(
    get,
    path = "/api/product-types/{id}",
    tag = "Catalog",
    responses(
        (status = 200, description = "Tipo de produto", body = Classification),
        (status = 404, description = "Não encontrado")
    ),
    params(("id" = i64, Path, description = "ID do tipo")),
    security(("api_jwt" = []))
)]
pub async fn get_product_type(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Classification>, AppError> {
    let item = app_state
        .catalog_service
        .get_classification(ClassificationKind::ProductType, id)
        .await?;
    Ok(Json(item))
}

#[utoipa::path(
    post,
    path = "/api/owner/product-types",
    tag = "Catalog",
    request_body = CreateClassificationPayload,
    responses(
        (status = 201, description = "Tipo criado", body = Classification),
        (status = 400, description = "Nome já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_product_type(
    State(app_state): State<AppState>,
    ApiJson(payload): ApiJson<CreateClassificationPayload>,
) -> Result<impl IntoResponse, AppError> {
    create_classification(&app_state, ClassificationKind::ProductType, payload).await
}

#[utoipa::path(
    put,
    path = "/api/owner/product-types/{id}",
    tag = "Catalog",
    request_body = UpdateClassificationPayload,
    responses((status = 200, description = "Tipo atualizado", body = Classification)),
    params(("id" = i64, Path, description = "ID do tipo")),
    security(("api_jwt" = []))
)]
pub async fn update_product_type(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<UpdateClassificationPayload>,
) -> Result<Json<Classification>, AppError> {
    update_classification(&app_state, ClassificationKind::ProductType, id, payload).await
}

#[utoipa::path(
    delete,
    path = "/api/owner/product-types/{id}",
    tag = "Catalog",
    responses((status = 204, description = "Tipo desativado")),
    params(("id" = i64, Path, description = "ID do tipo")),
    security(("api_jwt" = []))
)]
pub async fn delete_product_type(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    app_state
        .catalog_service
        .deactivate_classification(ClassificationKind::ProductType, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/teams",
    tag = "Catalog",
    responses((status = 200, description = "Equipes ativas", body = Vec<Classification>)),
    security(("api_jwt" = []))
)]
pub async fn list_teams(State(app_state): State<AppState>) -> Result<Json<Vec<Classification>>, AppError> {
    let items = app_state
        .catalog_service
        .list_classifications(ClassificationKind::Team)
        .await?;
    Ok(Json(items))
}

#[utoipa::path(
    get,
    path = "/api/teams/{id}",
    tag = "Catalog",
    responses(
        (status = 200, description = "Equipe", body = Classification),
        (status = 404, description = "Não encontrada")
    ),
    params(("id" = i64, Path, description = "ID da equipe")),
    security(("api_jwt" = []))
)]
pub async fn get_team(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Classification>, AppError> {
    let item = app_state
        .catalog_service
        .get_classification(ClassificationKind::Team, id)
        .await?;
    Ok(Json(item))
}

#[utoipa::path(
    post,
    path = "/api/owner/teams",
    tag = "Catalog",
    request_body = CreateClassificationPayload,
    responses(
        (status = 201, description = "Equipe criada", body = Classification),
        (status = 400, description = "Nome já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_team(
    State(app_state): State<AppState>,
    ApiJson(payload): ApiJson<CreateClassificationPayload>,
) -> Result<impl IntoResponse, AppError> {
    create_classification(&app_state, ClassificationKind::Team, payload).await
}

#[utoipa::path(
    put,
    path = "/api/owner/teams/{id}",
    tag = "Catalog",
    request_body = UpdateClassificationPayload,
    responses((status = 200, description = "Equipe atualizada", body = Classification)),
    params(("id" = i64, Path, description = "ID da equipe")),
    security(("api_jwt" = []))
)]
pub async fn update_team(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<UpdateClassificationPayload>,
) -> Result<Json<Classification>, AppError> {
    update_classification(&app_state, ClassificationKind::Team, id, payload).await
}

#[utoipa::path(
    delete,
    path = "/api/owner/teams/{id}",
    tag = "Catalog",
    responses((status = 204, description = "Equipe desativada")),
    params(("id" = i64, Path, description = "ID da equipe")),
    security(("api_jwt" = []))
)]
pub async fn delete_team(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    app_state
        .catalog_service
        .deactivate_classification(ClassificationKind::Team, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Estoque
// ---

#[utoipa::path(
    get,
    path = "/api/stock",
    tag = "Stock",
    responses((status = 200, description = "Estoque por variante", body = Vec<StockView>)),
    security(("api_jwt" = []))
)]
pub async fn list_stock(State(app_state): State<AppState>) -> Result<Json<Vec<StockView>>, AppError> {
    Ok(Json(app_state.catalog_service.list_stock().await?))
}

#[utoipa::path(
    get,
    path = "/api/stock/product/{id}",
    tag = "Stock",
    responses(
        (status = 200, description = "Estoque do produto", body = Vec<StockView>),
        (status = 404, description = "Produto não encontrado")
    ),
    params(("id" = i64, Path, description = "ID do produto")),
    security(("api_jwt" = []))
)]
pub async fn stock_for_product(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<StockView>>, AppError> {
    Ok(Json(app_state.catalog_service.stock_for_product(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/owner/stock",
    tag = "Stock",
    request_body = AddStockPayload,
    responses(
        (status = 201, description = "Estoque somado em cada talle × cor", body = Vec<StockEntry>),
        (status = 400, description = "Talle ou cor inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_stock(
    State(app_state): State<AppState>,
    ApiJson(payload): ApiJson<AddStockPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let entries = app_state
        .catalog_service
        .add_stock(payload.product_id, &payload.sizes, &payload.colors, payload.quantity)
        .await?;
    Ok((StatusCode::CREATED, Json(entries)))
}

#[utoipa::path(
    put,
    path = "/api/owner/stock/{id}",
    tag = "Stock",
    request_body = SetStockPayload,
    responses(
        (status = 200, description = "Quantidade sobrescrita", body = StockEntry),
        (status = 404, description = "Registro não encontrado")
    ),
    params(("id" = i64, Path, description = "ID do registro de estoque")),
    security(("api_jwt" = []))
)]
pub async fn set_stock(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<SetStockPayload>,
) -> Result<Json<StockEntry>, AppError> {
    payload.validate()?;
    let entry = app_state
        .catalog_service
        .set_stock_quantity(id, payload.quantity)
        .await?;
    Ok(Json(entry))
}

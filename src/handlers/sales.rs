// src/handlers/sales.rs

use std::collections::HashMap;
use std::path::Path as FsPath;
use std::str::FromStr;

use axum::{
    extract::{FromRequest, Multipart, Path, Request, State},
    http::{header, StatusCode},
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
    middleware::auth::AuthenticatedUser,
    models::sale::{
        CreateSalePayload, PaymentMethod, PaymentUpdateResponse, SaleDetail, SaleLinePayload,
        UpdateSalePayload,
    },
    services::receipt_store::{content_type_for, ReceiptUpload},
};

const RECEIPT_FIELD: &str = "receipt";

// ---
// Multipart
// ---

fn is_multipart(request: &Request) -> bool {
    request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"))
}

/// Campos de texto do formulário + o arquivo `receipt`, se veio.
async fn read_form(mut multipart: Multipart) -> Result<(HashMap<String, String>, Option<ReceiptUpload>), AppError> {
    let mut fields = HashMap::new();
    let mut receipt = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Formulario inválido: {}", e.body_text())))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == RECEIPT_FIELD {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Archivo inválido: {}", e.body_text())))?;
            // input de arquivo vazio no formulário = sem comprovante
            if !file_name.is_empty() || !bytes.is_empty() {
                receipt = Some(ReceiptUpload { file_name, bytes: bytes.to_vec() });
            }
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(format!("Campo '{}' inválido: {}", name, e.body_text())))?;
            fields.insert(name, value);
        }
    }

    Ok((fields, receipt))
}

fn optional_field<T: FromStr>(fields: &HashMap<String, String>, key: &str) -> Result<Option<T>, AppError> {
    match fields.get(key).map(|v| v.trim()).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| AppError::BadRequest(format!("Valor inválido para '{}': {}", key, raw))),
    }
}

fn required_field<T: FromStr>(fields: &HashMap<String, String>, key: &str) -> Result<T, AppError> {
    optional_field(fields, key)?
        .ok_or_else(|| AppError::BadRequest(format!("El campo '{}' es obligatorio.", key)))
}

/// Formulário multipart -> mesmo payload do corpo JSON.
/// Os itens chegam como uma string JSON no campo `items`.
pub fn sale_payload_from_form(fields: &HashMap<String, String>) -> Result<CreateSalePayload, AppError> {
    let raw_items = fields
        .get("items")
        .ok_or_else(|| AppError::BadRequest("El campo 'items' es obligatorio.".to_string()))?;
    let items: Vec<SaleLinePayload> = serde_json::from_str(raw_items)
        .map_err(|e| AppError::BadRequest(format!("Campo 'items' inválido: {}", e)))?;

    let apply_financed_discount = fields
        .get("applyFinancedDiscount")
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "on" | "si" | "sí"))
        .unwrap_or(false);

    Ok(CreateSalePayload {
        seller_id: optional_field(fields, "sellerId")?,
        customer_id: required_field(fields, "customerId")?,
        payment_method_id: required_field(fields, "paymentMethodId")?,
        sale_price: optional_field(fields, "salePrice")?,
        deposit: optional_field(fields, "deposit")?,
        apply_financed_discount,
        notes: fields.get("notes").filter(|n| !n.trim().is_empty()).cloned(),
        items,
    })
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PaymentPayload {
    #[validate(custom(function = "validate_not_negative"))]
    pub deposit: Decimal,
}

// ---
// Leitura
// ---

#[utoipa::path(
    get,
    path = "/api/payment-methods",
    tag = "Sales",
    responses((status = 200, description = "Formas de pagamento", body = Vec<PaymentMethod>)),
    security(("api_jwt" = []))
)]
pub async fn list_payment_methods(State(app_state): State<AppState>) -> Result<Json<Vec<PaymentMethod>>, AppError> {
    Ok(Json(app_state.sale_service.list_payment_methods().await?))
}

#[utoipa::path(
    get,
    path = "/api/mis-ventas",
    tag = "Sales",
    responses((status = 200, description = "Vendas do usuário autenticado", body = Vec<SaleDetail>)),
    security(("api_jwt" = []))
)]
pub async fn list_my_sales(
    State(app_state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
) -> Result<Json<Vec<SaleDetail>>, AppError> {
    Ok(Json(app_state.sale_service.list_for_seller(caller.id).await?))
}

#[utoipa::path(
    get,
    path = "/api/owner/ventas",
    tag = "Sales",
    responses((status = 200, description = "Todas as vendas", body = Vec<SaleDetail>)),
    security(("api_jwt" = []))
)]
pub async fn list_all_sales(State(app_state): State<AppState>) -> Result<Json<Vec<SaleDetail>>, AppError> {
    Ok(Json(app_state.sale_service.list_all().await?))
}

#[utoipa::path(
    get,
    path = "/api/owner/ventas/user/{id}",
    tag = "Sales",
    responses((status = 200, description = "Vendas de um vendedor", body = Vec<SaleDetail>)),
    params(("id" = i64, Path, description = "ID do vendedor")),
    security(("api_jwt" = []))
)]
pub async fn list_sales_by_user(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<SaleDetail>>, AppError> {
    Ok(Json(app_state.sale_service.list_for_seller(id).await?))
}

#[utoipa::path(
    get,
    path = "/api/ventas/{id}",
    tag = "Sales",
    responses(
        (status = 200, description = "Venda com itens", body = SaleDetail),
        (status = 403, description = "Venda de outro vendedor"),
        (status = 404, description = "Venda não encontrada")
    ),
    params(("id" = i64, Path, description = "ID da venda")),
    security(("api_jwt" = []))
)]
pub async fn get_sale(
    State(app_state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Json<SaleDetail>, AppError> {
    Ok(Json(app_state.sale_service.get_sale(&caller, id).await?))
}

// ---
// Escrita
// ---

#[utoipa::path(
    post,
    path = "/api/ventas",
    tag = "Sales",
    request_body(
        content = CreateSalePayload,
        description = "JSON, ou multipart/form-data com os mesmos campos, `items` como JSON e o arquivo opcional `receipt`"
    ),
    responses(
        (status = 201, description = "Venda criada com pedido pendente", body = SaleDetail),
        (status = 400, description = "Dados inválidos, referência inexistente ou estoque insuficiente")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_sale(
    State(app_state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    request: Request,
) -> Result<impl IntoResponse, AppError> {
    let (payload, receipt) = if is_multipart(&request) {
        let multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        let (fields, receipt) = read_form(multipart).await?;
        (sale_payload_from_form(&fields)?, receipt)
    } else {
        let ApiJson(payload) = ApiJson::<CreateSalePayload>::from_request(request, &()).await?;
        (payload, None)
    };
    payload.validate()?;

    let sale = app_state
        .sale_service
        .create_sale(&caller, payload, receipt)
        .await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

#[utoipa::path(
    put,
    path = "/api/ventas/{id}",
    tag = "Sales",
    request_body = UpdateSalePayload,
    responses(
        (status = 200, description = "Cabeçalho atualizado e valores recalculados", body = SaleDetail),
        (status = 404, description = "Venda não encontrada")
    ),
    params(("id" = i64, Path, description = "ID da venda")),
    security(("api_jwt" = []))
)]
pub async fn update_sale(
    State(app_state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<UpdateSalePayload>,
) -> Result<Json<SaleDetail>, AppError> {
    payload.validate()?;
    Ok(Json(app_state.sale_service.update_sale(&caller, id, payload).await?))
}

#[utoipa::path(
    put,
    path = "/api/ventas/{id}/pago",
    tag = "Sales",
    request_body(
        content = PaymentPayload,
        description = "multipart/form-data com `deposit` e o arquivo opcional `receipt` (JSON também é aceito)"
    ),
    responses(
        (status = 200, description = "Seña registrada", body = PaymentUpdateResponse),
        (status = 400, description = "Seña maior que o preço de venda ou arquivo inválido"),
        (status = 404, description = "Venda não encontrada")
    ),
    params(("id" = i64, Path, description = "ID da venda")),
    security(("api_jwt" = []))
)]
pub async fn update_payment(
    State(app_state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<PaymentUpdateResponse>, AppError> {
    let (payload, receipt) = if is_multipart(&request) {
        let multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        let (fields, receipt) = read_form(multipart).await?;
        (PaymentPayload { deposit: required_field(&fields, "deposit")? }, receipt)
    } else {
        let ApiJson(payload) = ApiJson::<PaymentPayload>::from_request(request, &()).await?;
        (payload, None)
    };
    payload.validate()?;

    let (sale, balance) = app_state
        .sale_service
        .update_payment(&caller, id, payload.deposit, receipt)
        .await?;

    Ok(Json(PaymentUpdateResponse {
        message: "Pago actualizado correctamente.".to_string(),
        sale,
        balance,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/ventas/{id}",
    tag = "Sales",
    responses(
        (status = 204, description = "Venda removida e estoque devolvido"),
        (status = 404, description = "Venda não encontrada")
    ),
    params(("id" = i64, Path, description = "ID da venda")),
    security(("api_jwt" = []))
)]
pub async fn delete_sale(
    State(app_state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    app_state.sale_service.delete_sale(&caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Comprovante
// ---

#[utoipa::path(
    get,
    path = "/api/ventas/{id}/comprobante",
    tag = "Sales",
    responses(
        (status = 200, description = "Arquivo do comprovante", content_type = "application/octet-stream"),
        (status = 404, description = "Sem comprovante")
    ),
    params(("id" = i64, Path, description = "ID da venda")),
    security(("api_jwt" = []))
)]
pub async fn download_receipt(
    State(app_state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let (bytes, path) = app_state.sale_service.read_receipt(&caller, id).await?;

    let file_name = FsPath::new(&path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("comprobante")
        .to_string();

    Ok((
        [
            (header::CONTENT_TYPE, content_type_for(&path).to_string()),
            (header::CONTENT_DISPOSITION, format!("inline; filename=\"{}\"", file_name)),
        ],
        bytes,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/ventas/{id}/comprobante",
    tag = "Sales",
    responses(
        (status = 204, description = "Comprovante removido"),
        (status = 404, description = "Venda sem comprovante")
    ),
    params(("id" = i64, Path, description = "ID da venda")),
    security(("api_jwt" = []))
)]
pub async fn delete_receipt(
    State(app_state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    app_state.sale_service.remove_receipt(&caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::catalog::{ProductColor, ProductSize};

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn form_fields_map_onto_the_json_payload() {
        let fields = form(&[
            ("customerId", "4"),
            ("paymentMethodId", "1"),
            ("deposit", "50.00"),
            ("salePrice", ""),
            ("applyFinancedDiscount", "true"),
            (
                "items",
                r#"[{"productId":7,"size":"M","color":"Azul","quantity":2,"unitPrice":100}]"#,
            ),
        ]);

        let payload = sale_payload_from_form(&fields).unwrap();

        assert_eq!(payload.customer_id, 4);
        assert_eq!(payload.seller_id, None);
        assert_eq!(payload.sale_price, None);
        assert_eq!(payload.deposit, Some(Decimal::new(5_000, 2)));
        assert!(payload.apply_financed_discount);
        assert_eq!(payload.items.len(), 1);
        assert_eq!(payload.items[0].size, ProductSize::M);
        assert_eq!(payload.items[0].color, ProductColor::Azul);
    }

    #[test]
    fn missing_or_malformed_fields_are_bad_requests() {
        let no_items = form(&[("customerId", "4"), ("paymentMethodId", "1")]);
        assert!(matches!(sale_payload_from_form(&no_items), Err(AppError::BadRequest(_))));

        let bad_id = form(&[("customerId", "cuatro"), ("paymentMethodId", "1"), ("items", "[]")]);
        assert!(matches!(sale_payload_from_form(&bad_id), Err(AppError::BadRequest(_))));

        let bad_items = form(&[("customerId", "4"), ("paymentMethodId", "1"), ("items", "{")]);
        assert!(matches!(sale_payload_from_form(&bad_items), Err(AppError::BadRequest(_))));
    }
}

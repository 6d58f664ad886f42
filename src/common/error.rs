// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

// Nosso tipo de erro único. Cada variante decide o status HTTP na resposta.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("{0}")]
    BadRequest(String),

    // Entidade referenciada no corpo da requisição não existe (400).
    #[error("{0}")]
    ReferenceNotFound(String),

    // Entidade do path não existe (404).
    #[error("{0}")]
    NotFound(String),

    // Regra de negócio violada, com payload legível por máquina.
    #[error("{message}")]
    BusinessRule { message: String, details: Value },

    #[error("{0}")]
    Forbidden(String),

    #[error("{0} ya existe")]
    AlreadyExists(String),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Usuário inativo")]
    InactiveUser,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Erro de I/O: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn business(message: impl Into<String>, details: Value) -> Self {
        AppError::BusinessRule { message: message.into(), details }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::BadRequest(_)
            | AppError::ReferenceNotFound(_)
            | AppError::BusinessRule { .. }
            | AppError::AlreadyExists(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::EmailAlreadyExists => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::InactiveUser | AppError::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_)
            | AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (message, details) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                tracing::warn!("Requisição rejeitada na validação: {:?}", details);
                ("Uno o más campos son inválidos.".to_string(), Some(json!(details)))
            }
            AppError::BusinessRule { message, details } => {
                tracing::warn!("Regra de negócio violada: {}", message);
                (message, Some(details))
            }
            AppError::BadRequest(msg)
            | AppError::ReferenceNotFound(msg)
            | AppError::NotFound(msg)
            | AppError::Forbidden(msg) => (msg, None),
            AppError::AlreadyExists(what) => (format!("{} ya existe", what), None),
            AppError::EmailAlreadyExists => ("El email ya está registrado.".to_string(), None),
            AppError::InvalidCredentials => ("Credenciales inválidas.".to_string(), None),
            AppError::InactiveUser => ("Usuario inactivo.".to_string(), None),
            AppError::InvalidToken => {
                ("Token de autenticación inválido o ausente.".to_string(), None)
            }

            // Erros de infraestrutura viram 500. O detalhe vai só para o log.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                ("Ocurrió un error inesperado.".to_string(), None)
            }
        };

        let body = match details {
            Some(details) => json!({ "error": message, "details": details }),
            None => json!({ "error": message }),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn maps_variants_to_status_codes() {
        assert_eq!(AppError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::ReferenceNotFound("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Forbidden("x".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::EmailAlreadyExists.status(), StatusCode::CONFLICT);
        assert_eq!(AppError::InactiveUser.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::DatabaseError(sqlx::Error::RowNotFound).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn business_rule_carries_details() {
        let response =
            AppError::business("No se puede eliminar", json!({ "sales": 2, "orders": 1 }))
                .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "No se puede eliminar");
        assert_eq!(body["details"]["sales"], 2);
    }

    #[tokio::test]
    async fn infrastructure_errors_hide_their_detail() {
        let response =
            AppError::InternalServerError(anyhow::anyhow!("connection refused")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(!text.contains("connection refused"));
    }
}

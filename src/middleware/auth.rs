// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};

use crate::{
    common::error::AppError,
    config::AppState,
    models::auth::Caller,
};

// Extrator para obter o usuário autenticado diretamente nos handlers.
// Montado só a partir das claims do token, sem ida ao banco.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Caller);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AppError::InvalidToken)
    }
}

// ---
// Guardas de rota
// ---

/// Exige `Authorization: Bearer <jwt>` válido e guarda o chamador nas extensions.
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let bearer = request
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or(AppError::InvalidToken)?;

    let claims = app_state.auth_service.tokens().decode(bearer.token())?;
    request
        .extensions_mut()
        .insert(AuthenticatedUser(Caller::from(claims)));

    Ok(next.run(request).await)
}

/// Roda depois do `auth_guard`: só o dono passa.
pub async fn owner_guard(request: Request, next: Next) -> Result<Response, AppError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or(AppError::InvalidToken)?;

    if !user.0.is_owner() {
        tracing::warn!("Acesso negado à área do dono para o usuário {}", user.0.id);
        return Err(AppError::Forbidden(
            "Acceso restringido al dueño.".to_string(),
        ));
    }

    Ok(next.run(request).await)
}

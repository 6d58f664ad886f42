// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{Claims, Role, User},
};

const TOKEN_TTL_HOURS: i64 = 24;

// Emissão e leitura dos JWT (HS256). Não depende do banco.
#[derive(Clone)]
pub struct TokenIssuer {
    secret: String,
}

impl TokenIssuer {
    pub fn new(secret: impl Into<String>) -> Self {
        Self { secret: secret.into() }
    }

    pub fn issue(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::hours(TOKEN_TTL_HOURS);

        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_ref()),
        )?)
    }

    /// Token inválido, expirado ou assinado com outro segredo: InvalidToken.
    pub fn decode(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;
        Ok(token_data.claims)
    }
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    tokens: TokenIssuer,
    pool: PgPool,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, tokens: TokenIssuer, pool: PgPool) -> Self {
        Self { user_repo, tokens, pool }
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    pub async fn register_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        raw_role: &str,
    ) -> Result<User, AppError> {
        let role = Role::from_legacy(raw_role).ok_or_else(|| {
            AppError::BadRequest("Rol inválido. Debe ser 'owner' o 'employee'.".to_string())
        })?;

        // Hash fora do runtime async (bcrypt é CPU-bound)
        let password_clone = password.to_owned();
        let hashed_password = tokio::task::spawn_blocking(move || {
            hash(&password_clone, bcrypt::DEFAULT_COST)
        })
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))?
            ?;

        let user = self.user_repo
            .create_user(&self.pool, name.trim(), email, &hashed_password, role)
            .await?;

        tracing::info!("👤 Usuário {} registrado com papel {:?}", user.id, user.role);
        Ok(user)
    }

    /// Devolve (token, usuário).
    pub async fn login_user(&self, email: &str, password: &str) -> Result<(String, User), AppError> {
        let user = self.user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || {
            verify(&password_clone, &password_hash_clone)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))?
        ?;

        if !is_password_valid {
            tracing::warn!("Login rejeitado para {}", email);
            return Err(AppError::InvalidCredentials);
        }
        if !user.active {
            return Err(AppError::InactiveUser);
        }

        let token = self.tokens.issue(&user)?;
        Ok((token, user))
    }

    pub async fn get_user(&self, id: i64) -> Result<User, AppError> {
        self.user_repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Usuario no encontrado.".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn sample_user(role: Role) -> User {
        User {
            id: 42,
            name: "Lucía".to_string(),
            email: "lucia@vartan.test".to_string(),
            password_hash: String::new(),
            role,
            active: true,
            commission_percentage: Decimal::new(10, 0),
            advertising_expense: Decimal::ZERO,
            base_salary: Decimal::ZERO,
            commission_notes: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn issued_token_round_trips_claims() {
        let issuer = TokenIssuer::new("segredo-de-teste");
        let token = issuer.issue(&sample_user(Role::Owner)).unwrap();

        let claims = issuer.decode(&token).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.email, "lucia@vartan.test");
        assert_eq!(claims.role, Role::Owner);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let token = TokenIssuer::new("um").issue(&sample_user(Role::Employee)).unwrap();
        let err = TokenIssuer::new("outro").decode(&token).unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }

    #[test]
    fn garbage_token_is_rejected() {
        let err = TokenIssuer::new("um").decode("nao.e.jwt").unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }
}

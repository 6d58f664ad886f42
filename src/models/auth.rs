// src/models/auth.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

// Papel do usuário. Conjunto fechado: dono ou empregado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Employee,
}

impl Role {
    /// Aceita a grafia atual e as grafias legadas dos papéis.
    pub fn from_legacy(raw: &str) -> Option<Role> {
        match raw.trim().to_lowercase().as_str() {
            "owner" | "dueño" | "dueno" => Some(Role::Owner),
            "employee" | "empleado" | "vendedor" | "seller" => Some(Role::Employee),
            _ => None,
        }
    }
}

// Quem está chamando a API, montado a partir das claims do token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub id: i64,
    pub email: String,
    pub role: Role,
}

impl Caller {
    pub fn is_owner(&self) -> bool {
        self.role == Role::Owner
    }

    /// Dono vê tudo; empregado só o que é dele.
    pub fn can_access(&self, owner_id: i64) -> bool {
        self.is_owner() || self.id == owner_id
    }
}

impl From<Claims> for Caller {
    fn from(claims: Claims) -> Self {
        Self { id: claims.sub, email: claims.email, role: claims.role }
    }
}

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    pub password_hash: String,

    pub role: Role,
    pub active: bool,
    pub commission_percentage: Decimal,
    pub advertising_expense: Decimal,
    pub base_salary: Decimal,
    pub commission_notes: String,
    pub created_at: DateTime<Utc>,
}

// Projeção curta de usuário, usada em respostas aninhadas.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
}

// Dados para registro de um novo usuário
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterUserPayload {
    #[validate(length(min = 1, max = 100, message = "El nombre es obligatorio."))]
    pub name: String,
    #[validate(email(message = "El email no es válido."))]
    pub email: String,
    #[validate(length(min = 6, message = "La contraseña debe tener al menos 6 caracteres."))]
    pub password: String,
    /// "owner" ou "employee" (grafias legadas também são aceitas).
    pub role: String,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(email(message = "El email no es válido."))]
    pub email: String,
    #[validate(length(min = 1, message = "La contraseña es obligatoria."))]
    pub password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub message: String,
    pub user: User,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,      // ID do usuário
    pub email: String,
    pub role: Role,
    pub exp: usize,
    pub iat: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_current_and_legacy_roles() {
        assert_eq!(Role::from_legacy("owner"), Some(Role::Owner));
        assert_eq!(Role::from_legacy("Dueño"), Some(Role::Owner));
        assert_eq!(Role::from_legacy("empleado"), Some(Role::Employee));
        assert_eq!(Role::from_legacy(" vendedor "), Some(Role::Employee));
        assert_eq!(Role::from_legacy("seller"), Some(Role::Employee));
        assert_eq!(Role::from_legacy("admin"), None);
    }

    #[test]
    fn employees_only_reach_their_own_records() {
        let employee = Caller { id: 7, email: "e@x.test".into(), role: Role::Employee };
        let owner = Caller { id: 1, email: "o@x.test".into(), role: Role::Owner };

        assert!(employee.can_access(7));
        assert!(!employee.can_access(8));
        assert!(owner.can_access(8));
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Owner).unwrap(), "\"owner\"");
        assert_eq!(serde_json::to_string(&Role::Employee).unwrap(), "\"employee\"");
    }
}

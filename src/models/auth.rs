// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::user::{Profile, Role};

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[validate(email(message = "email"))]
    #[schema(example = "maria@paoquente.com.br")]
    pub email: String,

    #[validate(length(min = 1, message = "required"))]
    pub password: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct PasswordResetPayload {
    #[schema(example = "maria@paoquente.com.br")]
    pub email: String,
}

// O fragmento da URL do link de recuperação, sem o '#'
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct RecoverySessionPayload {
    #[schema(example = "access_token=eyJ...&refresh_token=abc&type=recovery")]
    pub fragment: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct NewPasswordPayload {
    pub new_password: String,
    pub confirm_password: String,
}

// Corpo da rota privilegiada de criação de conta
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct ProvisionAuthPayload {
    #[schema(example = "maria@paoquente.com.br")]
    pub email: String,
    pub password: String,
}

// ---
// Respostas
// ---

// Tela para onde o cliente deve navegar após o fluxo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum Landing {
    #[serde(rename = "/atualizar-senha")]
    ChangePassword,
    #[serde(rename = "/empresa")]
    CompanyPanel,
    #[serde(rename = "/dashboard")]
    Dashboard,
    #[serde(rename = "/login")]
    Login,
}

impl Landing {
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::AdminEmpresa => Landing::CompanyPanel,
            Role::TupitecMaster | Role::TupitecStaff => Landing::Dashboard,
        }
    }
}

// Sessão emitida pelo provedor de identidade
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[schema(example = 3600)]
    pub expires_in: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub session: Session,
    pub redirect_to: Landing,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub profile: Profile,
    pub redirect_to: Landing,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecoverySessionResponse {
    pub session: Session,
    pub email: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<Landing>,
}

// Conta no provedor de identidade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_confirmed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProvisionOutcome {
    Created(AuthUser),
    AlreadyExists,
}

// Claims do JWT emitido pelo Supabase Auth
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    pub exp: usize,
    #[serde(default)]
    pub aud: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

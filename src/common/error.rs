// src/common/error.rs

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use utoipa::ToSchema;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::{
    common::i18n::{I18nStore, DEFAULT_LANG},
    middleware::i18n::Locale,
};

// Erros de domínio. Cada variante sabe seu status HTTP e a chave de tradução.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] ValidationErrors),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    ProfileNotFound,

    #[error("Usuário já cadastrado: {0}")]
    ProfileAlreadyExists(String),

    #[error("Perfil de usuário inválido: {0}")]
    InvalidRole(String),

    #[error("Acesso negado")]
    Forbidden,

    #[error("Empresa não encontrada")]
    CompanyNotFound,

    #[error("Recurso não encontrado: {0}")]
    ResourceNotFound(String),

    #[error("Senha muito curta")]
    PasswordTooShort,

    #[error("Senhas não coincidem")]
    PasswordMismatch,

    #[error("Falha ao atualizar a senha: {0}")]
    PasswordUpdateFailed(String),

    #[error("Senha atualizada, mas o perfil não")]
    ProfileFlagUpdateFailed,

    #[error("E-mail de redefinição ausente")]
    ResetEmailRequired,

    #[error("Falha ao enviar e-mail de redefinição: {0}")]
    ResetEmailFailed(String),

    #[error("Link de recuperação expirado")]
    RecoveryLinkExpired,

    #[error("Sessão de recuperação inválida")]
    RecoverySessionInvalid,

    #[error("Telefone inválido")]
    InvalidPhone,

    #[error("E-mail e senha são obrigatórios")]
    AuthCredentialsRequired,

    #[error("Conta de acesso já existe")]
    AuthUserAlreadyExists,

    #[error("Falha ao criar conta de acesso: {0}")]
    AuthProvisioningFailed(String),

    #[error("Erro no provedor de identidade: {0}")]
    IdentityProvider(String),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

// O formato que sai na resposta HTTP.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({ "error": self.error });
        if let Some(details) = self.details {
            body["details"] = details;
        }
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::PasswordTooShort
            | AppError::PasswordMismatch
            | AppError::ResetEmailRequired
            | AppError::InvalidPhone
            | AppError::AuthCredentialsRequired => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials
            | AppError::InvalidToken
            | AppError::RecoveryLinkExpired
            | AppError::RecoverySessionInvalid => StatusCode::UNAUTHORIZED,
            AppError::InvalidRole(_) | AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::ProfileNotFound
            | AppError::CompanyNotFound
            | AppError::ResourceNotFound(_) => StatusCode::NOT_FOUND,
            AppError::ProfileAlreadyExists(_) | AppError::AuthUserAlreadyExists => {
                StatusCode::CONFLICT
            }
            AppError::PasswordUpdateFailed(_)
            | AppError::ResetEmailFailed(_)
            | AppError::AuthProvisioningFailed(_)
            | AppError::IdentityProvider(_) => StatusCode::BAD_GATEWAY,
            AppError::ProfileFlagUpdateFailed
            | AppError::DatabaseError(_)
            | AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converte o erro de domínio na resposta traduzida para o idioma do cliente.
    pub fn to_api_error(self, locale: &Locale, i18n: &I18nStore) -> ApiError {
        let lang = locale.0.as_str();
        let status = self.status();

        let message = match &self {
            AppError::ValidationError(errors) => {
                let details = validation_details(errors, lang, i18n);
                return ApiError::new(status, i18n.translate(lang, "validation_failed", &[]))
                    .with_details(json!(details));
            }
            AppError::InvalidCredentials => i18n.translate(lang, "invalid_credentials", &[]),
            AppError::InvalidToken => i18n.translate(lang, "invalid_token", &[]),
            AppError::ProfileNotFound => i18n.translate(lang, "profile_not_found", &[]),
            AppError::ProfileAlreadyExists(email) => {
                i18n.translate(lang, "profile_already_exists", &[("email", email)])
            }
            AppError::InvalidRole(role) => {
                tracing::warn!("Perfil desconhecido recebido: '{}'", role);
                i18n.translate(lang, "invalid_role", &[])
            }
            AppError::Forbidden => i18n.translate(lang, "forbidden", &[]),
            AppError::CompanyNotFound => i18n.translate(lang, "company_not_found", &[]),
            AppError::ResourceNotFound(resource) => {
                i18n.translate(lang, "resource_not_found", &[("resource", resource)])
            }
            AppError::PasswordTooShort => i18n.translate(lang, "password_too_short", &[]),
            AppError::PasswordMismatch => i18n.translate(lang, "password_mismatch", &[]),
            AppError::PasswordUpdateFailed(detail) => {
                i18n.translate(lang, "password_update_failed", &[("detail", detail)])
            }
            AppError::ProfileFlagUpdateFailed => {
                i18n.translate(lang, "profile_flag_update_failed", &[])
            }
            AppError::ResetEmailRequired => i18n.translate(lang, "reset_email_required", &[]),
            AppError::ResetEmailFailed(detail) => {
                tracing::warn!("Falha ao enviar e-mail de redefinição: {}", detail);
                i18n.translate(lang, "reset_email_failed", &[])
            }
            AppError::RecoveryLinkExpired => i18n.translate(lang, "recovery_link_expired", &[]),
            AppError::RecoverySessionInvalid => {
                i18n.translate(lang, "recovery_session_invalid", &[])
            }
            AppError::InvalidPhone => i18n.translate(lang, "invalid_phone_update", &[]),
            AppError::AuthCredentialsRequired => {
                i18n.translate(lang, "auth_credentials_required", &[])
            }
            AppError::AuthUserAlreadyExists => i18n.translate(lang, "auth_user_exists", &[]),
            AppError::AuthProvisioningFailed(detail) => {
                i18n.translate(lang, "auth_provisioning_failed", &[("detail", detail)])
            }
            AppError::IdentityProvider(detail) => {
                tracing::error!("Erro no provedor de identidade: {}", detail);
                i18n.translate(lang, "identity_provider_error", &[])
            }
            // DatabaseError e InternalServerError: loga o detalhe, responde genérico.
            e => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                i18n.translate(lang, "internal_error", &[])
            }
        };

        ApiError::new(status, message)
    }
}

// Achata os erros do validator (inclusive structs aninhadas) em
// `{"campo": ["mensagem", ...]}`, usando `pai.filho` para aninhados.
fn validation_details(
    errors: &ValidationErrors,
    lang: &str,
    i18n: &I18nStore,
) -> BTreeMap<String, Vec<String>> {
    let mut details = BTreeMap::new();
    collect_validation_errors(errors, "", lang, i18n, &mut details);
    details
}

fn collect_validation_errors(
    errors: &ValidationErrors,
    prefix: &str,
    lang: &str,
    i18n: &I18nStore,
    out: &mut BTreeMap<String, Vec<String>>,
) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let messages = field_errors.iter().map(|e| {
                    let code = e.message.as_deref().unwrap_or(&*e.code);
                    let key = format!("validation.{}", code);
                    if i18n.has_key(DEFAULT_LANG, &key) {
                        i18n.translate(lang, &key, &[])
                    } else {
                        code.to_string()
                    }
                });
                out.entry(path).or_default().extend(messages);
            }
            ValidationErrorsKind::Struct(inner) => {
                collect_validation_errors(inner, &path, lang, i18n, out);
            }
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    let item_path = format!("{}[{}]", path, index);
                    collect_validation_errors(inner, &item_path, lang, i18n, out);
                }
            }
        }
    }
}

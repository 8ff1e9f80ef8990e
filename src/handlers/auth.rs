// src/handlers/auth.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::{AuthenticatedUser, CurrentSession},
        i18n::Locale,
    },
    models::auth::{
        Landing, LoginPayload, LoginResponse, MessageResponse, NewPasswordPayload,
        PasswordResetPayload, RecoverySessionPayload, RecoverySessionResponse, SessionResponse,
    },
    services::auth::landing_for,
};

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Sessão criada e tela de destino", body = LoginResponse),
        (status = 400, description = "Dados inválidos", body = ApiError),
        (status = 401, description = "Credenciais inválidas", body = ApiError),
        (status = 403, description = "Perfil de usuário inválido", body = ApiError),
        (status = 404, description = "Usuário sem cadastro na aplicação", body = ApiError)
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let response = app_state
        .auth_service
        .login(&payload.email, &payload.password)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    responses(
        (status = 204, description = "Sessão encerrada"),
        (status = 401, description = "Token inválido", body = ApiError)
    ),
    security(("api_jwt" = []))
)]
pub async fn logout(
    State(app_state): State<AppState>,
    locale: Locale,
    session: CurrentSession,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .auth_service
        .logout(&session.access_token)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/auth/session",
    tag = "Auth",
    responses(
        (status = 200, description = "Perfil da sessão atual e tela de destino", body = SessionResponse),
        (status = 401, description = "Token inválido", body = ApiError),
        (status = 403, description = "Perfil de usuário inválido", body = ApiError)
    ),
    security(("api_jwt" = []))
)]
pub async fn current_session(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(profile): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let redirect_to =
        landing_for(&profile).map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(SessionResponse {
        profile,
        redirect_to,
    }))
}

#[utoipa::path(
    post,
    path = "/api/auth/password-reset",
    tag = "Auth",
    request_body = PasswordResetPayload,
    responses(
        (status = 200, description = "Link de redefinição enviado", body = MessageResponse),
        (status = 400, description = "E-mail ausente", body = ApiError),
        (status = 502, description = "Falha ao enviar o link", body = ApiError)
    )
)]
pub async fn request_password_reset(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<PasswordResetPayload>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .auth_service
        .send_password_reset(&payload.email)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(MessageResponse {
        message: app_state
            .i18n_store
            .translate(&locale.0, "reset_email_sent", &[]),
        redirect_to: None,
    }))
}

#[utoipa::path(
    post,
    path = "/api/auth/recovery-session",
    tag = "Auth",
    request_body = RecoverySessionPayload,
    responses(
        (status = 200, description = "Sessão de recuperação restaurada", body = RecoverySessionResponse),
        (status = 401, description = "Link expirado ou sessão inválida", body = ApiError)
    )
)]
pub async fn restore_recovery_session(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<RecoverySessionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let restored = app_state
        .auth_service
        .restore_recovery_session(&payload.fragment)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(restored))
}

#[utoipa::path(
    post,
    path = "/api/auth/password/recover",
    tag = "Auth",
    request_body = NewPasswordPayload,
    responses(
        (status = 200, description = "Senha redefinida, voltar ao login", body = MessageResponse),
        (status = 400, description = "Senha curta ou confirmação diferente", body = ApiError),
        (status = 401, description = "Link expirado", body = ApiError)
    ),
    security(("api_jwt" = []))
)]
pub async fn recover_password(
    State(app_state): State<AppState>,
    locale: Locale,
    session: CurrentSession,
    Json(payload): Json<NewPasswordPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let redirect_to = app_state
        .auth_service
        .recover_password(&session.access_token, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(MessageResponse {
        message: app_state
            .i18n_store
            .translate(&locale.0, "password_recovered", &[]),
        redirect_to: Some(redirect_to),
    }))
}

#[utoipa::path(
    post,
    path = "/api/auth/password/change",
    tag = "Auth",
    request_body = NewPasswordPayload,
    responses(
        (status = 200, description = "Senha trocada e tela de destino", body = MessageResponse),
        (status = 400, description = "Senha curta ou confirmação diferente", body = ApiError),
        (status = 401, description = "Token inválido", body = ApiError),
        (status = 500, description = "Senha trocada, mas o perfil não foi atualizado", body = ApiError),
        (status = 502, description = "Falha ao atualizar a senha no provedor", body = ApiError)
    ),
    security(("api_jwt" = []))
)]
pub async fn change_password(
    State(app_state): State<AppState>,
    locale: Locale,
    session: CurrentSession,
    AuthenticatedUser(profile): AuthenticatedUser,
    Json(payload): Json<NewPasswordPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let redirect_to: Landing = app_state
        .auth_service
        .change_password(&session.access_token, &profile, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(MessageResponse {
        message: app_state
            .i18n_store
            .translate(&locale.0, "password_updated", &[]),
        redirect_to: Some(redirect_to),
    }))
}

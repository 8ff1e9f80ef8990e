// src/middleware/auth.rs

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::{
        auth::SessionClaims,
        user::{Profile, Role},
    },
};

// Sessão do provedor, já com a assinatura do JWT conferida
#[derive(Debug, Clone)]
pub struct CurrentSession {
    pub access_token: String,
    pub claims: SessionClaims,
}

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<CurrentSession>() {
            return Ok(session.clone());
        }

        let app_state = AppState::from_ref(state);
        let locale = Locale::from_header(
            parts
                .headers
                .get(header::ACCEPT_LANGUAGE)
                .and_then(|value| value.to_str().ok()),
        );
        let reject = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| reject(AppError::InvalidToken))?;

        let access_token = bearer.token().to_string();
        let claims = app_state
            .auth_service
            .validate_token(&access_token)
            .map_err(reject)?;

        Ok(CurrentSession {
            access_token,
            claims,
        })
    }
}

// Extrator para obter o perfil autenticado diretamente nos handlers
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Profile);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| ApiError::new(StatusCode::UNAUTHORIZED, "Usuário não autenticado"))
    }
}

// A empresa do admin_empresa autenticado. Só existe atrás do `company_guard`.
#[derive(Debug, Clone, Copy)]
pub struct CompanyContext(pub i64);

impl<S> FromRequestParts<S> for CompanyContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CompanyContext>()
            .copied()
            .ok_or_else(|| ApiError::new(StatusCode::FORBIDDEN, "Contexto da empresa não encontrado"))
    }
}

async fn authenticate(
    app_state: &AppState,
    locale: &Locale,
    session: &CurrentSession,
) -> Result<Profile, ApiError> {
    app_state
        .auth_service
        .current_profile(&session.claims)
        .await
        .map_err(|e| e.to_api_error(locale, &app_state.i18n_store))
}

fn role_of(profile: &Profile) -> Result<Role, AppError> {
    profile.role().map_err(AppError::InvalidRole)
}

/// Exige uma sessão válida com perfil cadastrado.
pub async fn auth_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    session: CurrentSession,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let profile = authenticate(&app_state, &locale, &session).await?;

    request.extensions_mut().insert(session);
    request.extensions_mut().insert(AuthenticatedUser(profile));
    Ok(next.run(request).await)
}

/// Exige um perfil da equipe da plataforma (tupitec_master ou tupitec_staff).
pub async fn staff_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    session: CurrentSession,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let profile = authenticate(&app_state, &locale, &session).await?;

    let role = role_of(&profile).map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    if !role.is_staff() {
        tracing::warn!("{} ({}) tentou acessar área da equipe", profile.email, role);
        return Err(AppError::Forbidden.to_api_error(&locale, &app_state.i18n_store));
    }

    request.extensions_mut().insert(session);
    request.extensions_mut().insert(AuthenticatedUser(profile));
    Ok(next.run(request).await)
}

/// Exige um admin_empresa com empresa vinculada e publica o `CompanyContext`.
pub async fn company_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    session: CurrentSession,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let profile = authenticate(&app_state, &locale, &session).await?;

    let role = role_of(&profile).map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    if role != Role::AdminEmpresa {
        return Err(AppError::Forbidden.to_api_error(&locale, &app_state.i18n_store));
    }

    let Some(company_id) = profile.company_id else {
        tracing::error!("Perfil {} sem empresa vinculada", profile.email);
        return Err(AppError::CompanyNotFound.to_api_error(&locale, &app_state.i18n_store));
    };

    request.extensions_mut().insert(session);
    request.extensions_mut().insert(AuthenticatedUser(profile));
    request.extensions_mut().insert(CompanyContext(company_id));
    Ok(next.run(request).await)
}

// src/handlers/panel.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{auth::CompanyContext, i18n::Locale},
    models::{
        attendant::{Attendant, AttendantPayload},
        company::{CompanyView, PhoneUpdatePayload},
        company_info::{CompanyInfo, CompanyInfoPayload},
    },
};

// ---
// Empresa
// ---

#[utoipa::path(
    get,
    path = "/api/panel/company",
    tag = "Panel",
    responses(
        (status = 200, description = "Dados da própria empresa", body = CompanyView),
        (status = 403, description = "Apenas para o administrador da empresa", body = ApiError),
        (status = 404, description = "Empresa não encontrada", body = ApiError)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_own_company(
    State(app_state): State<AppState>,
    locale: Locale,
    CompanyContext(company_id): CompanyContext,
) -> Result<impl IntoResponse, ApiError> {
    let company = app_state
        .panel_service
        .company(company_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(company))
}

#[utoipa::path(
    put,
    path = "/api/panel/company",
    tag = "Panel",
    request_body = PhoneUpdatePayload,
    responses(
        (status = 200, description = "Telefone atualizado", body = CompanyView),
        (status = 400, description = "Telefone inválido (faltando DDD?)", body = ApiError)
    ),
    security(("api_jwt" = []))
)]
pub async fn update_own_phone(
    State(app_state): State<AppState>,
    locale: Locale,
    CompanyContext(company_id): CompanyContext,
    Json(payload): Json<PhoneUpdatePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let company = app_state
        .panel_service
        .update_phone(company_id, &payload.phone)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(company))
}

// ---
// Informações
// ---

#[utoipa::path(
    get,
    path = "/api/panel/info",
    tag = "Panel",
    responses(
        (status = 200, description = "Informações da empresa, mais recentes primeiro", body = Vec<CompanyInfo>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_info(
    State(app_state): State<AppState>,
    locale: Locale,
    CompanyContext(company_id): CompanyContext,
) -> Result<impl IntoResponse, ApiError> {
    let entries = app_state
        .panel_service
        .list_info(company_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(entries))
}

#[utoipa::path(
    post,
    path = "/api/panel/info",
    tag = "Panel",
    request_body = CompanyInfoPayload,
    responses(
        (status = 201, description = "Informação criada", body = CompanyInfo),
        (status = 400, description = "Campos obrigatórios ausentes", body = ApiError)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_info(
    State(app_state): State<AppState>,
    locale: Locale,
    CompanyContext(company_id): CompanyContext,
    Json(payload): Json<CompanyInfoPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = app_state
        .panel_service
        .create_info(company_id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(entry)))
}

#[utoipa::path(
    put,
    path = "/api/panel/info/{id}",
    tag = "Panel",
    params(("id" = Uuid, Path, description = "ID da informação")),
    request_body = CompanyInfoPayload,
    responses(
        (status = 200, description = "Informação atualizada", body = CompanyInfo),
        (status = 404, description = "Informação não encontrada", body = ApiError)
    ),
    security(("api_jwt" = []))
)]
pub async fn update_info(
    State(app_state): State<AppState>,
    locale: Locale,
    CompanyContext(company_id): CompanyContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<CompanyInfoPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = app_state
        .panel_service
        .update_info(company_id, id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(entry))
}

#[utoipa::path(
    delete,
    path = "/api/panel/info/{id}",
    tag = "Panel",
    params(("id" = Uuid, Path, description = "ID da informação")),
    responses(
        (status = 204, description = "Informação removida"),
        (status = 404, description = "Informação não encontrada", body = ApiError)
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_info(
    State(app_state): State<AppState>,
    locale: Locale,
    CompanyContext(company_id): CompanyContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .panel_service
        .delete_info(company_id, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// ---
// Atendentes
// ---

#[utoipa::path(
    get,
    path = "/api/panel/attendants",
    tag = "Panel",
    responses(
        (status = 200, description = "Atendentes da empresa, mais recentes primeiro", body = Vec<Attendant>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_attendants(
    State(app_state): State<AppState>,
    locale: Locale,
    CompanyContext(company_id): CompanyContext,
) -> Result<impl IntoResponse, ApiError> {
    let attendants = app_state
        .panel_service
        .list_attendants(company_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(attendants))
}

#[utoipa::path(
    post,
    path = "/api/panel/attendants",
    tag = "Panel",
    request_body = AttendantPayload,
    responses(
        (status = 201, description = "Atendente criado", body = Attendant),
        (status = 400, description = "Campos obrigatórios ausentes", body = ApiError)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_attendant(
    State(app_state): State<AppState>,
    locale: Locale,
    CompanyContext(company_id): CompanyContext,
    Json(payload): Json<AttendantPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let attendant = app_state
        .panel_service
        .create_attendant(company_id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(attendant)))
}

#[utoipa::path(
    put,
    path = "/api/panel/attendants/{id}",
    tag = "Panel",
    params(("id" = Uuid, Path, description = "ID do atendente")),
    request_body = AttendantPayload,
    responses(
        (status = 200, description = "Atendente atualizado", body = Attendant),
        (status = 404, description = "Atendente não encontrado", body = ApiError)
    ),
    security(("api_jwt" = []))
)]
pub async fn update_attendant(
    State(app_state): State<AppState>,
    locale: Locale,
    CompanyContext(company_id): CompanyContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<AttendantPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let attendant = app_state
        .panel_service
        .update_attendant(company_id, id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(attendant))
}

#[utoipa::path(
    delete,
    path = "/api/panel/attendants/{id}",
    tag = "Panel",
    params(("id" = Uuid, Path, description = "ID do atendente")),
    responses(
        (status = 204, description = "Atendente removido"),
        (status = 404, description = "Atendente não encontrado", body = ApiError)
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_attendant(
    State(app_state): State<AppState>,
    locale: Locale,
    CompanyContext(company_id): CompanyContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .panel_service
        .delete_attendant(company_id, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

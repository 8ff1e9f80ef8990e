// src/handlers/companies.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Local;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::i18n::Locale,
    models::company::{CompanyDetail, CompanyDraft, CompanyView, CreateCompanyPayload, CreatedCompany},
};

#[utoipa::path(
    get,
    path = "/api/companies",
    tag = "Companies",
    responses(
        (status = 200, description = "Empresas, com as de pagamento pendente primeiro", body = Vec<CompanyView>),
        (status = 401, description = "Token inválido", body = ApiError),
        (status = 403, description = "Apenas para a equipe", body = ApiError)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_companies(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let companies = app_state
        .company_service
        .list()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(companies))
}

#[utoipa::path(
    get,
    path = "/api/companies/{id}",
    tag = "Companies",
    params(("id" = i64, Path, description = "ID da empresa")),
    responses(
        (status = 200, description = "Empresa e e-mail do responsável", body = CompanyDetail),
        (status = 404, description = "Empresa não encontrada", body = ApiError)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_company(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = app_state
        .company_service
        .get(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(detail))
}

#[utoipa::path(
    post,
    path = "/api/companies",
    tag = "Companies",
    request_body = CreateCompanyPayload,
    responses(
        (status = 201, description = "Empresa, conta de acesso e perfil criados", body = CreatedCompany),
        (status = 400, description = "Campos obrigatórios ausentes ou inválidos", body = ApiError),
        (status = 409, description = "Perfil já cadastrado para o e-mail", body = ApiError),
        (status = 502, description = "Falha ao criar a conta de acesso", body = ApiError)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_company(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<CreateCompanyPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let today = Local::now().date_naive();

    let created = app_state
        .company_service
        .create(payload, today)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/api/companies/{id}",
    tag = "Companies",
    params(("id" = i64, Path, description = "ID da empresa")),
    request_body = CompanyDraft,
    responses(
        (status = 200, description = "Empresa atualizada", body = CompanyView),
        (status = 400, description = "Campos obrigatórios ausentes ou inválidos", body = ApiError),
        (status = 404, description = "Empresa não encontrada", body = ApiError)
    ),
    security(("api_jwt" = []))
)]
pub async fn update_company(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<i64>,
    Json(draft): Json<CompanyDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = app_state
        .company_service
        .update(id, draft)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(updated))
}

#[utoipa::path(
    delete,
    path = "/api/companies/{id}",
    tag = "Companies",
    params(("id" = i64, Path, description = "ID da empresa")),
    responses(
        (status = 204, description = "Empresa e perfis vinculados removidos"),
        (status = 404, description = "Empresa não encontrada", body = ApiError)
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_company(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .company_service
        .delete(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

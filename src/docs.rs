// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::common::error::ApiError;
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::current_session,
        handlers::auth::request_password_reset,
        handlers::auth::restore_recovery_session,
        handlers::auth::recover_password,
        handlers::auth::change_password,

        // --- Companies ---
        handlers::companies::list_companies,
        handlers::companies::get_company,
        handlers::companies::create_company,
        handlers::companies::update_company,
        handlers::companies::delete_company,

        // --- Provisioning ---
        handlers::provisioning::create_auth_account,

        // --- Panel ---
        handlers::panel::get_own_company,
        handlers::panel::update_own_phone,
        handlers::panel::list_info,
        handlers::panel::create_info,
        handlers::panel::update_info,
        handlers::panel::delete_info,
        handlers::panel::list_attendants,
        handlers::panel::create_attendant,
        handlers::panel::update_attendant,
        handlers::panel::delete_attendant,
    ),
    components(
        schemas(
            ApiError,

            // --- Auth ---
            models::auth::LoginPayload,
            models::auth::PasswordResetPayload,
            models::auth::RecoverySessionPayload,
            models::auth::NewPasswordPayload,
            models::auth::ProvisionAuthPayload,
            models::auth::Landing,
            models::auth::Session,
            models::auth::LoginResponse,
            models::auth::SessionResponse,
            models::auth::RecoverySessionResponse,
            models::auth::MessageResponse,
            models::auth::AuthUser,
            models::user::Role,
            models::user::Profile,

            // --- Companies ---
            models::company::Plan,
            models::company::CompanyStatus,
            models::company::Company,
            models::company::CompanyView,
            models::company::CompanyDraft,
            models::company::ResponsiblePayload,
            models::company::CreateCompanyPayload,
            models::company::AuthAccountStatus,
            models::company::CreatedCompany,
            models::company::CompanyDetail,
            models::company::PhoneUpdatePayload,
            handlers::provisioning::ProvisionedUser,
            handlers::provisioning::ProvisionConflict,

            // --- Panel ---
            models::company_info::CompanyInfo,
            models::company_info::CompanyInfoPayload,
            models::attendant::Attendant,
            models::attendant::AttendantPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Login, sessão e senhas"),
        (name = "Companies", description = "Diretório de empresas (equipe Tupitec)"),
        (name = "Provisioning", description = "Criação de contas no provedor de identidade"),
        (name = "Panel", description = "Painel do administrador da empresa")
    ),
    info(
        title = "Painel Empresas • Tupitec",
        version = env!("CARGO_PKG_VERSION"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

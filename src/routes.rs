// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::AppState,
    docs::ApiDoc,
    handlers,
    middleware::auth::{auth_guard, company_guard, staff_guard},
};

pub fn app_router(app_state: AppState) -> Router {
    // Rotas públicas de autenticação (ou que só exigem o token do provedor)
    let auth_routes = Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout))
        .route("/password-reset", post(handlers::auth::request_password_reset))
        .route("/recovery-session", post(handlers::auth::restore_recovery_session))
        .route("/password/recover", post(handlers::auth::recover_password));

    // Exigem perfil cadastrado
    let session_routes = Router::new()
        .route("/session", get(handlers::auth::current_session))
        .route("/password/change", post(handlers::auth::change_password))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Equipe da plataforma
    let staff_routes = Router::new()
        .route(
            "/api/companies",
            get(handlers::companies::list_companies).post(handlers::companies::create_company),
        )
        .route(
            "/api/companies/{id}",
            get(handlers::companies::get_company)
                .put(handlers::companies::update_company)
                .delete(handlers::companies::delete_company),
        )
        .route("/api/criar-auth", post(handlers::provisioning::create_auth_account))
        .route("/api/criar-usuario", post(handlers::provisioning::create_auth_account))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            staff_guard,
        ));

    // Painel do administrador da empresa
    let panel_routes = Router::new()
        .route(
            "/company",
            get(handlers::panel::get_own_company).put(handlers::panel::update_own_phone),
        )
        .route(
            "/info",
            get(handlers::panel::list_info).post(handlers::panel::create_info),
        )
        .route(
            "/info/{id}",
            put(handlers::panel::update_info).delete(handlers::panel::delete_info),
        )
        .route(
            "/attendants",
            get(handlers::panel::list_attendants).post(handlers::panel::create_attendant),
        )
        .route(
            "/attendants/{id}",
            put(handlers::panel::update_attendant).delete(handlers::panel::delete_attendant),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            company_guard,
        ));

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes.merge(session_routes))
        .merge(staff_routes)
        .nest("/api/panel", panel_routes)
        .with_state(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

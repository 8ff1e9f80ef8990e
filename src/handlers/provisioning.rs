// src/handlers/provisioning.rs

// Rota privilegiada que cria contas direto no provedor de identidade.
// Mantém o formato de resposta próprio (`{user}` / `{error, conflict}`)
// consumido pelo painel.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::auth::{AuthUser, ProvisionAuthPayload},
};

#[derive(Debug, Serialize, ToSchema)]
pub struct ProvisionedUser {
    pub user: AuthUser,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProvisionConflict {
    pub error: String,
    pub conflict: bool,
}

#[utoipa::path(
    post,
    path = "/api/criar-auth",
    tag = "Provisioning",
    request_body = ProvisionAuthPayload,
    responses(
        (status = 201, description = "Conta criada com e-mail confirmado", body = ProvisionedUser),
        (status = 400, description = "E-mail ou senha ausentes", body = ApiError),
        (status = 409, description = "Conta já existe", body = ProvisionConflict),
        (status = 500, description = "Falha no provedor de identidade", body = ApiError)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_auth_account(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<ProvisionAuthPayload>,
) -> Response {
    match app_state.auth_service.provision_account(&payload).await {
        Ok(user) => {
            tracing::info!("Conta de acesso criada para {:?}", user.email);
            (StatusCode::CREATED, Json(ProvisionedUser { user })).into_response()
        }
        Err(AppError::AuthUserAlreadyExists) => {
            let error = app_state
                .i18n_store
                .translate(&locale.0, "auth_user_exists", &[]);
            (
                StatusCode::CONFLICT,
                Json(ProvisionConflict {
                    error,
                    conflict: true,
                }),
            )
                .into_response()
        }
        Err(AppError::AuthProvisioningFailed(detail) | AppError::IdentityProvider(detail)) => {
            tracing::error!("Falha ao criar conta de acesso: {}", detail);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": detail }))).into_response()
        }
        Err(e) => e.to_api_error(&locale, &app_state.i18n_store).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::test_support::{bearer_token, json_body, test_app, TestBackends};

    fn request(path: &str, token: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(path)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn creates_account_for_staff() {
        let backends = TestBackends::with_staff("equipe@tupitec.dev");
        let app = test_app(&backends);

        let response = app
            .oneshot(request(
                "/api/criar-auth",
                &bearer_token("equipe@tupitec.dev"),
                json!({"email": "nova@empresa.com", "password": "11987654321"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(body["user"]["email"], "nova@empresa.com");
    }

    #[tokio::test]
    async fn existing_account_is_a_flagged_conflict() {
        let backends = TestBackends::with_staff("equipe@tupitec.dev");
        let app = test_app(&backends);

        // A conta conhecida do provedor falso é a do próprio usuário da equipe
        let response = app
            .oneshot(request(
                "/api/criar-usuario",
                &bearer_token("equipe@tupitec.dev"),
                json!({"email": "equipe@tupitec.dev", "password": "x"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = json_body(response).await;
        assert_eq!(body["conflict"], true);
        assert_eq!(body["error"], "Usuário já existe");
    }

    #[tokio::test]
    async fn missing_fields_are_rejected() {
        let backends = TestBackends::with_staff("equipe@tupitec.dev");
        let app = test_app(&backends);

        let response = app
            .oneshot(request(
                "/api/criar-auth",
                &bearer_token("equipe@tupitec.dev"),
                json!({"email": "nova@empresa.com"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "Email e senha são obrigatórios");
    }

    #[tokio::test]
    async fn provider_failure_is_a_500_with_detail() {
        let backends = TestBackends::with_staff("equipe@tupitec.dev");
        backends.identity.fail_admin_create();
        let app = test_app(&backends);

        let response = app
            .oneshot(request(
                "/api/criar-auth",
                &bearer_token("equipe@tupitec.dev"),
                json!({"email": "nova@empresa.com", "password": "x"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await["error"], "provedor indisponível");
    }

    #[tokio::test]
    async fn company_admins_cannot_provision() {
        let backends = TestBackends::with_company_admin("dono@empresa.com", 1);
        let app = test_app(&backends);

        let response = app
            .oneshot(request(
                "/api/criar-auth",
                &bearer_token("dono@empresa.com"),
                json!({"email": "nova@empresa.com", "password": "x"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}

// src/services/identity.rs

// Cliente do Supabase Auth (GoTrue). Toda identidade e senha vivem no
// provedor; aqui só montamos as chamadas REST e traduzimos as respostas.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::json;

use crate::{
    common::error::AppError,
    models::auth::{AuthUser, ProvisionOutcome, Session},
};

// Sessão + usuário devolvidos pelos fluxos de login e refresh
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSession {
    pub session: Session,
    pub user: AuthUser,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AppError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), AppError>;

    /// Valida o token no provedor e devolve o usuário dono da sessão.
    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AppError>;

    async fn update_password(
        &self,
        access_token: &str,
        new_password: &str,
    ) -> Result<AuthUser, AppError>;

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, AppError>;

    async fn send_password_reset_email(
        &self,
        email: &str,
        redirect_to: &str,
    ) -> Result<(), AppError>;

    /// Chamada privilegiada (service role). O e-mail já sai confirmado.
    async fn admin_create_user(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProvisionOutcome, AppError>;
}

#[derive(Clone)]
pub struct SupabaseAuthClient {
    http: Client,
    base_url: String,
    anon_key: String,
    service_role_key: String,
}

// Resposta de /token
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: i64,
    user: AuthUser,
}

impl From<TokenResponse> for AuthSession {
    fn from(token: TokenResponse) -> Self {
        AuthSession {
            session: Session {
                access_token: token.access_token,
                refresh_token: token.refresh_token,
                expires_in: token.expires_in,
            },
            user: token.user,
        }
    }
}

// O GoTrue já mudou o formato de erro entre versões; aceitamos todos.
#[derive(Debug, Default, Deserialize)]
struct ProviderError {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ProviderError {
    fn text(&self) -> String {
        self.msg
            .as_ref()
            .or(self.message.as_ref())
            .or(self.error_description.as_ref())
            .or(self.error.as_ref())
            .cloned()
            .unwrap_or_else(|| "erro desconhecido".to_string())
    }

    fn is_user_already_registered(&self) -> bool {
        let code_matches = matches!(
            self.error_code.as_deref(),
            Some("email_exists") | Some("user_already_exists")
        );
        let text = self.text();
        code_matches
            || text.contains("already been registered")
            || text.contains("User already registered")
    }
}

impl SupabaseAuthClient {
    pub fn new(
        base_url: impl Into<String>,
        anon_key: impl Into<String>,
        service_role_key: impl Into<String>,
    ) -> Result<Self, AppError> {
        let http = Client::builder()
            .build()
            .map_err(|e| anyhow::anyhow!("Falha ao criar cliente HTTP: {}", e))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            service_role_key: service_role_key.into(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.base_url, path)
    }

    // Requisição pública (chave anon)
    fn public(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header("apikey", &self.anon_key)
    }

    // Requisição em nome do usuário
    fn as_user(&self, builder: RequestBuilder, access_token: &str) -> RequestBuilder {
        self.public(builder).bearer_auth(access_token)
    }

    // Requisição privilegiada; nunca sai deste servidor
    fn as_service(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, AppError> {
        builder.send().await.map_err(|e| {
            AppError::IdentityProvider(format!("Falha na requisição ao Supabase Auth: {}", e))
        })
    }

    async fn read_error(response: Response) -> (StatusCode, ProviderError) {
        let status = response.status();
        let body = response.json::<ProviderError>().await.unwrap_or_default();
        (status, body)
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, AppError> {
        response.json::<T>().await.map_err(|e| {
            AppError::IdentityProvider(format!("Resposta inesperada do Supabase Auth: {}", e))
        })
    }
}

#[async_trait]
impl IdentityProvider for SupabaseAuthClient {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AppError> {
        let request = self.public(
            self.http
                .post(self.endpoint("/token"))
                .query(&[("grant_type", "password")])
                .json(&json!({ "email": email, "password": password })),
        );
        let response = self.send(request).await?;

        if response.status().is_success() {
            let token: TokenResponse = Self::read_json(response).await?;
            return Ok(token.into());
        }

        let (status, error) = Self::read_error(response).await;
        if status.is_client_error() {
            // Senha errada, usuário inexistente, e-mail não confirmado: tudo vira
            // "credenciais inválidas" para não revelar quais e-mails existem.
            tracing::debug!("Login recusado pelo provedor ({}): {}", status, error.text());
            return Err(AppError::InvalidCredentials);
        }
        Err(AppError::IdentityProvider(format!("{}: {}", status, error.text())))
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AppError> {
        let request = self.as_user(self.http.post(self.endpoint("/logout")), access_token);
        let response = self.send(request).await?;

        match response.status() {
            s if s.is_success() => Ok(()),
            // Sessão já encerrada ou expirada
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => Ok(()),
            _ => {
                let (status, error) = Self::read_error(response).await;
                Err(AppError::IdentityProvider(format!("{}: {}", status, error.text())))
            }
        }
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AppError> {
        let request = self.as_user(self.http.get(self.endpoint("/user")), access_token);
        let response = self.send(request).await?;

        if response.status().is_success() {
            return Self::read_json(response).await;
        }

        let (status, error) = Self::read_error(response).await;
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AppError::InvalidToken),
            _ => Err(AppError::IdentityProvider(format!("{}: {}", status, error.text()))),
        }
    }

    async fn update_password(
        &self,
        access_token: &str,
        new_password: &str,
    ) -> Result<AuthUser, AppError> {
        let request = self.as_user(
            self.http
                .put(self.endpoint("/user"))
                .json(&json!({ "password": new_password })),
            access_token,
        );
        let response = self.send(request).await?;

        if response.status().is_success() {
            return Self::read_json(response).await;
        }

        let (status, error) = Self::read_error(response).await;
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AppError::InvalidToken),
            _ => Err(AppError::PasswordUpdateFailed(error.text())),
        }
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, AppError> {
        let request = self.public(
            self.http
                .post(self.endpoint("/token"))
                .query(&[("grant_type", "refresh_token")])
                .json(&json!({ "refresh_token": refresh_token })),
        );
        let response = self.send(request).await?;

        if response.status().is_success() {
            let token: TokenResponse = Self::read_json(response).await?;
            return Ok(token.into());
        }

        let (status, error) = Self::read_error(response).await;
        if status.is_client_error() {
            return Err(AppError::InvalidToken);
        }
        Err(AppError::IdentityProvider(format!("{}: {}", status, error.text())))
    }

    async fn send_password_reset_email(
        &self,
        email: &str,
        redirect_to: &str,
    ) -> Result<(), AppError> {
        let request = self.public(
            self.http
                .post(self.endpoint("/recover"))
                .query(&[("redirect_to", redirect_to)])
                .json(&json!({ "email": email })),
        );
        let response = self.send(request).await?;

        if response.status().is_success() {
            return Ok(());
        }

        let (status, error) = Self::read_error(response).await;
        Err(AppError::ResetEmailFailed(format!("{}: {}", status, error.text())))
    }

    async fn admin_create_user(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProvisionOutcome, AppError> {
        let request = self.as_service(self.http.post(self.endpoint("/admin/users")).json(
            &json!({
                "email": email,
                "password": password,
                "email_confirm": true,
            }),
        ));
        let response = self.send(request).await?;

        if response.status().is_success() {
            let user: AuthUser = Self::read_json(response).await?;
            return Ok(ProvisionOutcome::Created(user));
        }

        let (status, error) = Self::read_error(response).await;
        if error.is_user_already_registered() {
            return Ok(ProvisionOutcome::AlreadyExists);
        }
        Err(AppError::AuthProvisioningFailed(format!("{}: {}", status, error.text())))
    }
}

// src/services/auth.rs

use std::sync::Arc;

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::{
        auth::{
            AuthUser, Landing, LoginResponse, NewPasswordPayload, ProvisionAuthPayload,
            ProvisionOutcome, RecoverySessionResponse, Session, SessionClaims,
        },
        user::{Profile, Role},
    },
    services::identity::IdentityProvider,
};

const MIN_PASSWORD_LEN: usize = 6;
const TOKEN_AUDIENCE: &str = "authenticated";

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    identity: Arc<dyn IdentityProvider>,
    jwt_secret: String,
    reset_redirect_url: String,
}

/// Decide a tela inicial de um perfil recém-autenticado.
///
/// A troca de senha obrigatória vence qualquer perfil; um perfil desconhecido
/// é recusado.
pub fn landing_for(profile: &Profile) -> Result<Landing, AppError> {
    if profile.must_change_password {
        return Ok(Landing::ChangePassword);
    }
    profile
        .role()
        .map(Landing::for_role)
        .map_err(AppError::InvalidRole)
}

pub fn validate_new_password(payload: &NewPasswordPayload) -> Result<(), AppError> {
    if payload.new_password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::PasswordTooShort);
    }
    if payload.new_password != payload.confirm_password {
        return Err(AppError::PasswordMismatch);
    }
    Ok(())
}

// Os tokens do link de recuperação chegam no fragmento da URL
struct RecoveryFragment {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
}

fn parse_recovery_fragment(fragment: &str) -> Option<RecoveryFragment> {
    let fragment = fragment.trim().trim_start_matches('#');

    let mut kind = None;
    let mut access_token = None;
    let mut refresh_token = None;
    let mut expires_in = 0;

    for (name, value) in url::form_urlencoded::parse(fragment.as_bytes()) {
        match name.as_ref() {
            "type" => kind = Some(value.into_owned()),
            "access_token" if !value.is_empty() => access_token = Some(value.into_owned()),
            "refresh_token" if !value.is_empty() => refresh_token = Some(value.into_owned()),
            "expires_in" => expires_in = value.parse().unwrap_or(0),
            _ => {}
        }
    }

    match (kind.as_deref(), access_token, refresh_token) {
        (Some("recovery"), Some(access_token), Some(refresh_token)) => Some(RecoveryFragment {
            access_token,
            refresh_token,
            expires_in,
        }),
        _ => None,
    }
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        identity: Arc<dyn IdentityProvider>,
        jwt_secret: String,
        reset_redirect_url: String,
    ) -> Self {
        Self {
            users,
            identity,
            jwt_secret,
            reset_redirect_url,
        }
    }

    /// Login: autentica no provedor, busca o perfil pelo e-mail e decide o destino.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AppError> {
        let signed_in = self.identity.sign_in_with_password(email, password).await?;

        let profile = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AppError::ProfileNotFound)?;

        let redirect_to = match landing_for(&profile) {
            Ok(landing) => landing,
            Err(e) => {
                // Sem destino válido, a sessão recém-criada não é entregue.
                if let Err(sign_out_err) = self
                    .identity
                    .sign_out(&signed_in.session.access_token)
                    .await
                {
                    tracing::warn!("Falha ao encerrar sessão de perfil inválido: {}", sign_out_err);
                }
                return Err(e);
            }
        };

        tracing::info!("Login de {} redirecionado para {:?}", email, redirect_to);

        Ok(LoginResponse {
            session: signed_in.session,
            redirect_to,
        })
    }

    pub async fn logout(&self, access_token: &str) -> Result<(), AppError> {
        self.identity.sign_out(access_token).await
    }

    /// Valida localmente o JWT emitido pelo Supabase Auth.
    pub fn validate_token(&self, token: &str) -> Result<SessionClaims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[TOKEN_AUDIENCE]);

        let token_data = decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        Ok(token_data.claims)
    }

    /// O perfil da aplicação ligado à sessão.
    pub async fn current_profile(&self, claims: &SessionClaims) -> Result<Profile, AppError> {
        let email = claims.email.as_deref().ok_or(AppError::InvalidToken)?;
        self.users
            .find_by_email(email)
            .await?
            .ok_or(AppError::ProfileNotFound)
    }

    pub async fn send_password_reset(&self, email: &str) -> Result<(), AppError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AppError::ResetEmailRequired);
        }

        self.identity
            .send_password_reset_email(email, &self.reset_redirect_url)
            .await
            .map_err(|e| match e {
                AppError::ResetEmailFailed(_) => e,
                other => AppError::ResetEmailFailed(other.to_string()),
            })
    }

    /// Restaura a sessão a partir do fragmento do link de recuperação.
    /// Token vencido é renovado com o refresh token.
    pub async fn restore_recovery_session(
        &self,
        fragment: &str,
    ) -> Result<RecoverySessionResponse, AppError> {
        let recovery = parse_recovery_fragment(fragment).ok_or(AppError::RecoverySessionInvalid)?;

        match self.identity.get_user(&recovery.access_token).await {
            Ok(user) => Ok(RecoverySessionResponse {
                session: Session {
                    access_token: recovery.access_token,
                    refresh_token: recovery.refresh_token,
                    expires_in: recovery.expires_in,
                },
                email: user.email,
            }),
            Err(AppError::InvalidToken) => {
                let refreshed = self
                    .identity
                    .refresh_session(&recovery.refresh_token)
                    .await
                    .map_err(|e| {
                        tracing::warn!("Falha ao renovar sessão de recuperação: {}", e);
                        AppError::RecoveryLinkExpired
                    })?;
                Ok(RecoverySessionResponse {
                    session: refreshed.session,
                    email: refreshed.user.email,
                })
            }
            Err(e) => {
                tracing::warn!("Falha ao restaurar sessão de recuperação: {}", e);
                Err(AppError::RecoveryLinkExpired)
            }
        }
    }

    /// Variante do link de recuperação: troca a senha e manda de volta ao login.
    pub async fn recover_password(
        &self,
        access_token: &str,
        payload: &NewPasswordPayload,
    ) -> Result<Landing, AppError> {
        validate_new_password(payload)?;

        self.identity
            .update_password(access_token, &payload.new_password)
            .await
            .map_err(|e| {
                tracing::warn!("Falha ao redefinir senha via link: {}", e);
                AppError::RecoveryLinkExpired
            })?;

        Ok(Landing::Login)
    }

    /// Variante do primeiro acesso: troca a senha, limpa a flag do perfil e
    /// redireciona conforme o perfil.
    pub async fn change_password(
        &self,
        access_token: &str,
        profile: &Profile,
        payload: &NewPasswordPayload,
    ) -> Result<Landing, AppError> {
        validate_new_password(payload)?;

        let user = self
            .identity
            .update_password(access_token, &payload.new_password)
            .await?;

        let email = user.email.unwrap_or_else(|| profile.email.clone());

        self.users
            .set_must_change_password(&email, false)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Senha de {} atualizada, mas a flag precisa_trocar_senha não: {}",
                    email,
                    e
                );
                AppError::ProfileFlagUpdateFailed
            })?;

        let refreshed = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AppError::ProfileNotFound)?;

        Ok(match refreshed.role() {
            Ok(Role::AdminEmpresa) => Landing::CompanyPanel,
            _ => Landing::Dashboard,
        })
    }

    /// A rota privilegiada de criação de conta no provedor.
    pub async fn provision_account(
        &self,
        payload: &ProvisionAuthPayload,
    ) -> Result<AuthUser, AppError> {
        let email = payload.email.trim();
        if email.is_empty() || payload.password.is_empty() {
            return Err(AppError::AuthCredentialsRequired);
        }

        match self.identity.admin_create_user(email, &payload.password).await? {
            ProvisionOutcome::Created(user) => Ok(user),
            ProvisionOutcome::AlreadyExists => Err(AppError::AuthUserAlreadyExists),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        bearer_token, profile, FakeIdentity, InMemoryUsers, IdentityCall, TEST_JWT_SECRET,
    };

    fn service(users: Arc<InMemoryUsers>, identity: Arc<FakeIdentity>) -> AuthService {
        AuthService::new(
            users,
            identity,
            TEST_JWT_SECRET.to_string(),
            "https://painel.exemplo/nova-senha".to_string(),
        )
    }

    fn passwords(new_password: &str, confirm_password: &str) -> NewPasswordPayload {
        NewPasswordPayload {
            new_password: new_password.into(),
            confirm_password: confirm_password.into(),
        }
    }

    #[test]
    fn forced_password_change_wins_over_every_role() {
        for role in ["tupitec_master", "tupitec_staff", "admin_empresa", "desconhecido"] {
            let mut p = profile("a@b.com", role, Some(1));
            p.must_change_password = true;
            assert_eq!(landing_for(&p).unwrap(), Landing::ChangePassword, "perfil {role}");
        }
    }

    #[test]
    fn roles_route_to_their_landing() {
        let staff = profile("a@b.com", "tupitec_staff", None);
        let master = profile("a@b.com", "tupitec_master", None);
        let admin = profile("a@b.com", "admin_empresa", Some(1));
        assert_eq!(landing_for(&staff).unwrap(), Landing::Dashboard);
        assert_eq!(landing_for(&master).unwrap(), Landing::Dashboard);
        assert_eq!(landing_for(&admin).unwrap(), Landing::CompanyPanel);
        assert!(matches!(
            landing_for(&profile("a@b.com", "gerente", None)),
            Err(AppError::InvalidRole(role)) if role == "gerente"
        ));
    }

    #[test]
    fn new_password_rules() {
        assert!(matches!(
            validate_new_password(&passwords("12345", "12345")),
            Err(AppError::PasswordTooShort)
        ));
        assert!(matches!(
            validate_new_password(&passwords("123456", "654321")),
            Err(AppError::PasswordMismatch)
        ));
        assert!(validate_new_password(&passwords("123456", "123456")).is_ok());
    }

    #[test]
    fn recovery_fragment_requires_type_and_both_tokens() {
        let ok = parse_recovery_fragment("#access_token=a&refresh_token=r&expires_in=3600&type=recovery")
            .unwrap();
        assert_eq!(ok.access_token, "a");
        assert_eq!(ok.refresh_token, "r");
        assert_eq!(ok.expires_in, 3600);

        assert!(parse_recovery_fragment("access_token=a&refresh_token=r&type=signup").is_none());
        assert!(parse_recovery_fragment("access_token=a&type=recovery").is_none());
        assert!(parse_recovery_fragment("").is_none());
    }

    #[tokio::test]
    async fn login_routes_company_admin_to_panel() {
        let users = InMemoryUsers::with(vec![profile("maria@empresa.com", "admin_empresa", Some(7))]);
        let identity = FakeIdentity::accepting("maria@empresa.com", "segredo");

        let response = service(users, identity)
            .login("maria@empresa.com", "segredo")
            .await
            .unwrap();

        assert_eq!(response.redirect_to, Landing::CompanyPanel);
        assert!(!response.session.access_token.is_empty());
    }

    #[tokio::test]
    async fn login_with_flag_goes_to_password_change() {
        let mut p = profile("joao@tupitec.dev", "tupitec_master", None);
        p.must_change_password = true;
        let users = InMemoryUsers::with(vec![p]);
        let identity = FakeIdentity::accepting("joao@tupitec.dev", "segredo");

        let response = service(users, identity)
            .login("joao@tupitec.dev", "segredo")
            .await
            .unwrap();

        assert_eq!(response.redirect_to, Landing::ChangePassword);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_look_the_same() {
        let users = InMemoryUsers::with(vec![profile("maria@empresa.com", "admin_empresa", Some(7))]);
        let identity = FakeIdentity::accepting("maria@empresa.com", "segredo");
        let auth = service(users, identity);

        assert!(matches!(
            auth.login("maria@empresa.com", "errada").await,
            Err(AppError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("ninguem@empresa.com", "segredo").await,
            Err(AppError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn login_without_profile_row_is_reported() {
        let users = InMemoryUsers::with(vec![]);
        let identity = FakeIdentity::accepting("orfao@empresa.com", "segredo");

        let result = service(users, identity).login("orfao@empresa.com", "segredo").await;

        assert!(matches!(result, Err(AppError::ProfileNotFound)));
    }

    #[tokio::test]
    async fn login_with_unknown_role_signs_out_and_fails() {
        let users = InMemoryUsers::with(vec![profile("x@empresa.com", "gerente", None)]);
        let identity = FakeIdentity::accepting("x@empresa.com", "segredo");

        let result = service(users, identity.clone()).login("x@empresa.com", "segredo").await;

        assert!(matches!(result, Err(AppError::InvalidRole(_))));
        assert!(identity.calls().iter().any(|c| matches!(c, IdentityCall::SignOut)));
    }

    #[tokio::test]
    async fn token_validation_accepts_provider_tokens_only() {
        let auth = service(InMemoryUsers::with(vec![]), FakeIdentity::accepting("a@b.com", "x"));

        let claims = auth.validate_token(&bearer_token("a@b.com")).unwrap();
        assert_eq!(claims.email.as_deref(), Some("a@b.com"));

        assert!(matches!(auth.validate_token("lixo"), Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn reset_requires_email_and_uses_configured_redirect() {
        let identity = FakeIdentity::accepting("a@b.com", "x");
        let auth = service(InMemoryUsers::with(vec![]), identity.clone());

        assert!(matches!(
            auth.send_password_reset("  ").await,
            Err(AppError::ResetEmailRequired)
        ));

        auth.send_password_reset("a@b.com").await.unwrap();
        assert!(identity.calls().iter().any(|c| matches!(
            c,
            IdentityCall::PasswordReset { email, redirect_to }
                if email == "a@b.com" && redirect_to == "https://painel.exemplo/nova-senha"
        )));
    }

    #[tokio::test]
    async fn recovery_session_refreshes_expired_access_token() {
        let identity = FakeIdentity::accepting("a@b.com", "x");
        let auth = service(InMemoryUsers::with(vec![]), identity.clone());

        let restored = auth
            .restore_recovery_session("access_token=vencido&refresh_token=valido&type=recovery")
            .await
            .unwrap();

        assert_eq!(restored.session.access_token, "access-renovado");
        assert!(identity.calls().iter().any(|c| matches!(c, IdentityCall::Refresh)));
    }

    #[tokio::test]
    async fn recovery_session_with_dead_tokens_expired() {
        let identity = FakeIdentity::accepting("a@b.com", "x");
        let auth = service(InMemoryUsers::with(vec![]), identity);

        let result = auth
            .restore_recovery_session("access_token=vencido&refresh_token=vencido&type=recovery")
            .await;

        assert!(matches!(result, Err(AppError::RecoveryLinkExpired)));
    }

    #[tokio::test]
    async fn forced_change_clears_flag_and_routes_by_role() {
        let mut p = profile("maria@empresa.com", "admin_empresa", Some(7));
        p.must_change_password = true;
        let users = InMemoryUsers::with(vec![p.clone()]);
        let identity = FakeIdentity::accepting("maria@empresa.com", "segredo");
        let auth = service(users.clone(), identity);

        let landing = auth
            .change_password("token", &p, &passwords("nova-senha", "nova-senha"))
            .await
            .unwrap();

        assert_eq!(landing, Landing::CompanyPanel);
        assert!(!users.get("maria@empresa.com").unwrap().must_change_password);
    }

    #[tokio::test]
    async fn forced_change_reports_profile_flag_failure() {
        let p = profile("maria@empresa.com", "tupitec_staff", None);
        let users = InMemoryUsers::with(vec![p.clone()]);
        users.fail_flag_updates();
        let auth = service(users, FakeIdentity::accepting("maria@empresa.com", "segredo"));

        let result = auth
            .change_password("token", &p, &passwords("nova-senha", "nova-senha"))
            .await;

        assert!(matches!(result, Err(AppError::ProfileFlagUpdateFailed)));
    }

    #[tokio::test]
    async fn provisioning_maps_outcomes() {
        let identity = FakeIdentity::accepting("existe@empresa.com", "x");
        let auth = service(InMemoryUsers::with(vec![]), identity);

        let missing = ProvisionAuthPayload {
            email: "".into(),
            password: "x".into(),
        };
        assert!(matches!(
            auth.provision_account(&missing).await,
            Err(AppError::AuthCredentialsRequired)
        ));

        let existing = ProvisionAuthPayload {
            email: "existe@empresa.com".into(),
            password: "x".into(),
        };
        assert!(matches!(
            auth.provision_account(&existing).await,
            Err(AppError::AuthUserAlreadyExists)
        ));

        let fresh = ProvisionAuthPayload {
            email: "nova@empresa.com".into(),
            password: "x".into(),
        };
        let user = auth.provision_account(&fresh).await.unwrap();
        assert_eq!(user.email.as_deref(), Some("nova@empresa.com"));
    }
}

// src/test_support.rs

// Implementações em memória dos repositórios e do provedor de identidade,
// usadas pelos testes de serviço e de rota.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{body::Body, response::Response, Router};
use chrono::{Duration, NaiveDate, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::{AppState, Backends, Config},
    db::{AttendantRepository, CompanyInfoRepository, CompanyRepository, UserRepository},
    models::{
        attendant::{Attendant, AttendantPayload},
        auth::{AuthUser, ProvisionOutcome, Session, SessionClaims},
        company::{Company, CompanyStatus, NewCompany, Plan},
        company_info::{CompanyInfo, CompanyInfoPayload},
        user::{NewProfile, Profile},
    },
    services::identity::{AuthSession, IdentityProvider},
};

pub const TEST_JWT_SECRET: &str = "segredo-de-teste-com-pelo-menos-32-caracteres";

/// JWT no formato do Supabase Auth, assinado com o segredo de teste.
pub fn bearer_token(email: &str) -> String {
    let claims = SessionClaims {
        sub: Uuid::new_v4(),
        email: Some(email.to_string()),
        exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
        aud: Some("authenticated".to_string()),
        role: Some("authenticated".to_string()),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn profile(email: &str, role: &str, company_id: Option<i64>) -> Profile {
    Profile {
        id: Uuid::new_v4(),
        email: email.to_string(),
        name: Some("Fulano".to_string()),
        role_name: role.to_string(),
        company_id,
        must_change_password: false,
        created_at: Utc::now(),
    }
}

pub fn company(id: i64, payment_ok: bool) -> Company {
    Company {
        id,
        name: format!("Empresa {id}"),
        state: "Paraná".to_string(),
        phone: "4133334444".to_string(),
        domain: format!("empresa{id}.com.br"),
        responsible_name: "Fulano".to_string(),
        cnpj: "12345678000199".to_string(),
        payment_ok,
        plan: Plan::Free,
        due_day: 10,
        status: CompanyStatus::Active,
        created_at: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
    }
}

fn unavailable() -> AppError {
    AppError::DatabaseError(sqlx::Error::PoolTimedOut)
}

// Registro compartilhado das escritas, para verificar a ordem entre repositórios.
#[derive(Clone, Default)]
pub struct OperationLog(Arc<Mutex<Vec<String>>>);

impl OperationLog {
    fn record(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

// ---
// Empresas
// ---

#[derive(Default)]
pub struct InMemoryCompanies {
    rows: Mutex<Vec<Company>>,
    log: OperationLog,
}

impl InMemoryCompanies {
    pub fn with(rows: Vec<Company>) -> Arc<Self> {
        Self::logged(rows, OperationLog::default())
    }

    pub fn logged(rows: Vec<Company>, log: OperationLog) -> Arc<Self> {
        Arc::new(Self {
            rows: Mutex::new(rows),
            log,
        })
    }

    pub fn insert(&self, company: Company) {
        self.rows.lock().unwrap().push(company);
    }

    pub fn get(&self, id: i64) -> Option<Company> {
        self.rows.lock().unwrap().iter().find(|c| c.id == id).cloned()
    }

    pub fn all(&self) -> Vec<Company> {
        self.rows.lock().unwrap().clone()
    }

    pub fn log(&self) -> OperationLog {
        self.log.clone()
    }
}

fn apply(company: &mut Company, changes: &NewCompany) {
    company.name = changes.name.clone();
    company.state = changes.state.clone();
    company.phone = changes.phone.clone();
    company.domain = changes.domain.clone();
    company.responsible_name = changes.responsible_name.clone();
    company.cnpj = changes.cnpj.clone();
    company.payment_ok = changes.payment_ok;
    company.plan = changes.plan;
    company.due_day = changes.due_day;
    company.status = changes.status;
    company.created_at = changes.created_at;
}

#[async_trait]
impl CompanyRepository for InMemoryCompanies {
    async fn list_all(&self) -> Result<Vec<Company>, AppError> {
        let mut rows = self.all();
        rows.sort_by_key(|c| c.id);
        Ok(rows)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Company>, AppError> {
        Ok(self.get(id))
    }

    async fn create(&self, changes: &NewCompany) -> Result<Company, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let id = rows.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        let mut company = company(id, false);
        apply(&mut company, changes);
        rows.push(company.clone());
        self.log.record(format!("empresas.create({id})"));
        Ok(company)
    }

    async fn update(&self, id: i64, changes: &NewCompany) -> Result<Option<Company>, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let Some(company) = rows.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        apply(company, changes);
        self.log.record(format!("empresas.update({id})"));
        Ok(Some(company.clone()))
    }

    async fn update_phone(&self, id: i64, phone: &str) -> Result<Option<Company>, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let Some(company) = rows.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        company.phone = phone.to_string();
        self.log.record(format!("empresas.update_phone({id})"));
        Ok(Some(company.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|c| c.id != id);
        self.log.record(format!("empresas.delete({id})"));
        Ok(rows.len() != before)
    }
}

// ---
// Perfis
// ---

#[derive(Default)]
pub struct InMemoryUsers {
    rows: Mutex<Vec<Profile>>,
    log: OperationLog,
    fail_flag_updates: Mutex<bool>,
    fail_deletes: Mutex<bool>,
}

impl InMemoryUsers {
    pub fn with(rows: Vec<Profile>) -> Arc<Self> {
        Self::logged(rows, OperationLog::default())
    }

    pub fn logged(rows: Vec<Profile>, log: OperationLog) -> Arc<Self> {
        Arc::new(Self {
            rows: Mutex::new(rows),
            log,
            ..Default::default()
        })
    }

    pub fn insert(&self, profile: Profile) {
        self.rows.lock().unwrap().push(profile);
    }

    pub fn get(&self, email: &str) -> Option<Profile> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.email == email)
            .cloned()
    }

    pub fn fail_flag_updates(&self) {
        *self.fail_flag_updates.lock().unwrap() = true;
    }

    pub fn fail_deletes(&self) {
        *self.fail_deletes.lock().unwrap() = true;
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn find_by_email(&self, email: &str) -> Result<Option<Profile>, AppError> {
        Ok(self.get(email))
    }

    async fn find_company_admin(&self, company_id: i64) -> Result<Option<Profile>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.company_id == Some(company_id) && p.role_name == "admin_empresa")
            .cloned())
    }

    async fn create(&self, new: &NewProfile) -> Result<Profile, AppError> {
        if self.get(&new.email).is_some() {
            return Err(AppError::ProfileAlreadyExists(new.email.clone()));
        }
        let created = Profile {
            id: Uuid::new_v4(),
            email: new.email.clone(),
            name: new.name.clone(),
            role_name: new.role.as_str().to_string(),
            company_id: new.company_id,
            must_change_password: new.must_change_password,
            created_at: Utc::now(),
        };
        self.insert(created.clone());
        self.log.record(format!("usuarios.create({})", new.email));
        Ok(created)
    }

    async fn set_must_change_password(&self, email: &str, value: bool) -> Result<u64, AppError> {
        if *self.fail_flag_updates.lock().unwrap() {
            return Err(unavailable());
        }
        let mut rows = self.rows.lock().unwrap();
        let mut affected = 0;
        for p in rows.iter_mut().filter(|p| p.email == email) {
            p.must_change_password = value;
            affected += 1;
        }
        Ok(affected)
    }

    async fn delete_by_company(&self, company_id: i64) -> Result<u64, AppError> {
        if *self.fail_deletes.lock().unwrap() {
            return Err(unavailable());
        }
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|p| p.company_id != Some(company_id));
        self.log
            .record(format!("usuarios.delete_by_company({company_id})"));
        Ok((before - rows.len()) as u64)
    }
}

// ---
// Informações e atendentes
// ---

#[derive(Default)]
pub struct InMemoryCompanyInfo {
    rows: Mutex<Vec<CompanyInfo>>,
}

impl InMemoryCompanyInfo {
    pub fn empty() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl CompanyInfoRepository for InMemoryCompanyInfo {
    async fn list_by_company(&self, company_id: i64) -> Result<Vec<CompanyInfo>, AppError> {
        let mut rows: Vec<CompanyInfo> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.company_id == company_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn create(
        &self,
        company_id: i64,
        info: &CompanyInfoPayload,
    ) -> Result<CompanyInfo, AppError> {
        let created = CompanyInfo {
            id: Uuid::new_v4(),
            company_id,
            key: info.key.clone(),
            value: info.value.clone(),
            description: info.description.clone(),
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        company_id: i64,
        id: Uuid,
        info: &CompanyInfoPayload,
    ) -> Result<Option<CompanyInfo>, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows
            .iter_mut()
            .find(|i| i.id == id && i.company_id == company_id)
        else {
            return Ok(None);
        };
        row.key = info.key.clone();
        row.value = info.value.clone();
        row.description = info.description.clone();
        Ok(Some(row.clone()))
    }

    async fn delete(&self, company_id: i64, id: Uuid) -> Result<bool, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|i| !(i.id == id && i.company_id == company_id));
        Ok(rows.len() != before)
    }
}

#[derive(Default)]
pub struct InMemoryAttendants {
    rows: Mutex<Vec<Attendant>>,
}

impl InMemoryAttendants {
    pub fn empty() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl AttendantRepository for InMemoryAttendants {
    async fn list_by_company(&self, company_id: i64) -> Result<Vec<Attendant>, AppError> {
        let mut rows: Vec<Attendant> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.company_id == company_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn create(
        &self,
        company_id: i64,
        attendant: &AttendantPayload,
    ) -> Result<Attendant, AppError> {
        let created = Attendant {
            id: Uuid::new_v4(),
            company_id,
            name: attendant.name.clone(),
            personality_style: attendant.personality_style.clone(),
            dialect: attendant.dialect.clone(),
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        company_id: i64,
        id: Uuid,
        attendant: &AttendantPayload,
    ) -> Result<Option<Attendant>, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows
            .iter_mut()
            .find(|a| a.id == id && a.company_id == company_id)
        else {
            return Ok(None);
        };
        row.name = attendant.name.clone();
        row.personality_style = attendant.personality_style.clone();
        row.dialect = attendant.dialect.clone();
        Ok(Some(row.clone()))
    }

    async fn delete(&self, company_id: i64, id: Uuid) -> Result<bool, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|a| !(a.id == id && a.company_id == company_id));
        Ok(rows.len() != before)
    }
}

// ---
// Provedor de identidade
// ---

#[derive(Debug, Clone, PartialEq)]
pub enum IdentityCall {
    SignIn { email: String },
    SignOut,
    GetUser,
    UpdatePassword,
    Refresh,
    PasswordReset { email: String, redirect_to: String },
    AdminCreate { email: String, password: String },
}

// Conhece uma única conta. Tokens "vencido" são recusados.
pub struct FakeIdentity {
    email: String,
    password: String,
    calls: Mutex<Vec<IdentityCall>>,
    fail_admin_create: Mutex<bool>,
}

impl FakeIdentity {
    pub fn accepting(email: &str, password: &str) -> Arc<Self> {
        Arc::new(Self {
            email: email.to_string(),
            password: password.to_string(),
            calls: Mutex::new(Vec::new()),
            fail_admin_create: Mutex::new(false),
        })
    }

    pub fn calls(&self) -> Vec<IdentityCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fail_admin_create(&self) {
        *self.fail_admin_create.lock().unwrap() = true;
    }

    fn record(&self, call: IdentityCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn user(&self, email: &str) -> AuthUser {
        AuthUser {
            id: Uuid::new_v4(),
            email: Some(email.to_string()),
            email_confirmed_at: Some(Utc::now()),
            created_at: Some(Utc::now()),
        }
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AppError> {
        self.record(IdentityCall::SignIn {
            email: email.to_string(),
        });
        if email != self.email || password != self.password {
            return Err(AppError::InvalidCredentials);
        }
        Ok(AuthSession {
            session: Session {
                access_token: bearer_token(email),
                refresh_token: "refresh-token".to_string(),
                expires_in: 3600,
            },
            user: self.user(email),
        })
    }

    async fn sign_out(&self, _access_token: &str) -> Result<(), AppError> {
        self.record(IdentityCall::SignOut);
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AppError> {
        self.record(IdentityCall::GetUser);
        if access_token == "vencido" {
            return Err(AppError::InvalidToken);
        }
        Ok(self.user(&self.email))
    }

    async fn update_password(
        &self,
        access_token: &str,
        _new_password: &str,
    ) -> Result<AuthUser, AppError> {
        self.record(IdentityCall::UpdatePassword);
        if access_token == "vencido" {
            return Err(AppError::InvalidToken);
        }
        Ok(self.user(&self.email))
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, AppError> {
        self.record(IdentityCall::Refresh);
        if refresh_token == "vencido" {
            return Err(AppError::InvalidToken);
        }
        Ok(AuthSession {
            session: Session {
                access_token: "access-renovado".to_string(),
                refresh_token: "refresh-renovado".to_string(),
                expires_in: 3600,
            },
            user: self.user(&self.email),
        })
    }

    async fn send_password_reset_email(
        &self,
        email: &str,
        redirect_to: &str,
    ) -> Result<(), AppError> {
        self.record(IdentityCall::PasswordReset {
            email: email.to_string(),
            redirect_to: redirect_to.to_string(),
        });
        Ok(())
    }

    async fn admin_create_user(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProvisionOutcome, AppError> {
        self.record(IdentityCall::AdminCreate {
            email: email.to_string(),
            password: password.to_string(),
        });
        if *self.fail_admin_create.lock().unwrap() {
            return Err(AppError::AuthProvisioningFailed(
                "provedor indisponível".to_string(),
            ));
        }
        if email == self.email {
            return Ok(ProvisionOutcome::AlreadyExists);
        }
        Ok(ProvisionOutcome::Created(self.user(email)))
    }
}

// ---
// Aplicação montada sobre as implementações em memória
// ---

pub struct TestBackends {
    pub companies: Arc<InMemoryCompanies>,
    pub users: Arc<InMemoryUsers>,
    pub company_info: Arc<InMemoryCompanyInfo>,
    pub attendants: Arc<InMemoryAttendants>,
    pub identity: Arc<FakeIdentity>,
}

pub const TEST_PASSWORD: &str = "senha-atual";

impl TestBackends {
    fn for_account(email: &str, profile: Profile, companies: Vec<Company>) -> Self {
        Self {
            companies: InMemoryCompanies::with(companies),
            users: InMemoryUsers::with(vec![profile]),
            company_info: InMemoryCompanyInfo::empty(),
            attendants: InMemoryAttendants::empty(),
            identity: FakeIdentity::accepting(email, TEST_PASSWORD),
        }
    }

    pub fn with_staff(email: &str) -> Self {
        Self::for_account(email, profile(email, "tupitec_staff", None), vec![])
    }

    pub fn with_company_admin(email: &str, company_id: i64) -> Self {
        Self::for_account(
            email,
            profile(email, "admin_empresa", Some(company_id)),
            vec![company(company_id, true)],
        )
    }

    pub fn with_profile(profile: Profile) -> Self {
        let email = profile.email.clone();
        let companies = profile
            .company_id
            .map(|id| vec![company(id, true)])
            .unwrap_or_default();
        Self::for_account(&email, profile, companies)
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/painel_teste".to_string(),
        database_max_connections: 1,
        supabase_url: "http://localhost:54321".to_string(),
        supabase_anon_key: "anon".to_string(),
        supabase_service_role_key: "service".to_string(),
        supabase_jwt_secret: TEST_JWT_SECRET.to_string(),
        password_reset_redirect_url: "https://painel.exemplo/nova-senha".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
    }
}

pub fn test_app(backends: &TestBackends) -> Router {
    let state = AppState::new(
        &test_config(),
        Backends {
            companies: backends.companies.clone(),
            users: backends.users.clone(),
            company_info: backends.company_info.clone(),
            attendants: backends.attendants.clone(),
            identity: backends.identity.clone(),
        },
    )
    .unwrap();
    crate::routes::app_router(state)
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

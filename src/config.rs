// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{
        AttendantRepository, CompanyInfoRepository, CompanyRepository, PgAttendantRepository,
        PgCompanyInfoRepository, PgCompanyRepository, PgUserRepository, UserRepository,
    },
    services::{
        auth::AuthService,
        company_service::CompanyService,
        identity::{IdentityProvider, SupabaseAuthClient},
        panel_service::PanelService,
    },
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_RESET_REDIRECT_URL: &str = "https://painel.tupitec.dev/nova-senha";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

// Configuração lida do ambiente (com .env opcional)
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_service_role_key: String,
    pub supabase_jwt_secret: String,
    pub password_reset_redirect_url: String,
    pub bind_addr: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let required = |name: &str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .with_context(|| format!("{} deve ser definida", name))
        };
        let optional = |name: &str, default: &str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let database_max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(value) => value
                .trim()
                .parse()
                .with_context(|| format!("DATABASE_MAX_CONNECTIONS inválido: '{}'", value))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            database_max_connections,
            supabase_url: required("SUPABASE_URL")?,
            supabase_anon_key: required("SUPABASE_ANON_KEY")?,
            supabase_service_role_key: required("SUPABASE_SERVICE_ROLE_KEY")?,
            supabase_jwt_secret: required("SUPABASE_JWT_SECRET")?,
            password_reset_redirect_url: optional(
                "PASSWORD_RESET_REDIRECT_URL",
                DEFAULT_RESET_REDIRECT_URL,
            ),
            bind_addr: optional("BIND_ADDR", DEFAULT_BIND_ADDR),
        })
    }
}

pub async fn connect_database(config: &Config) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(Duration::from_secs(3))
        .connect(&config.database_url)
        .await
        .context("Falha ao conectar ao banco de dados")?;

    tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");
    Ok(pool)
}

// As dependências externas do estado. Em produção: Postgres + Supabase Auth.
pub struct Backends {
    pub companies: Arc<dyn CompanyRepository>,
    pub users: Arc<dyn UserRepository>,
    pub company_info: Arc<dyn CompanyInfoRepository>,
    pub attendants: Arc<dyn AttendantRepository>,
    pub identity: Arc<dyn IdentityProvider>,
}

impl Backends {
    pub fn connect(config: &Config, pool: PgPool) -> anyhow::Result<Self> {
        let identity = SupabaseAuthClient::new(
            &config.supabase_url,
            &config.supabase_anon_key,
            &config.supabase_service_role_key,
        )
        .map_err(|e| anyhow::anyhow!("Falha ao montar o cliente do Supabase Auth: {}", e))?;

        Ok(Self {
            companies: Arc::new(PgCompanyRepository::new(pool.clone())),
            users: Arc::new(PgUserRepository::new(pool.clone())),
            company_info: Arc::new(PgCompanyInfoRepository::new(pool.clone())),
            attendants: Arc::new(PgAttendantRepository::new(pool)),
            identity: Arc::new(identity),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub company_service: CompanyService,
    pub panel_service: PanelService,
    pub i18n_store: I18nStore,
}

impl AppState {
    pub fn new(config: &Config, backends: Backends) -> anyhow::Result<Self> {
        let Backends {
            companies,
            users,
            company_info,
            attendants,
            identity,
        } = backends;

        // --- Monta o gráfico de dependências ---
        let auth_service = AuthService::new(
            users.clone(),
            identity.clone(),
            config.supabase_jwt_secret.clone(),
            config.password_reset_redirect_url.clone(),
        );
        let company_service = CompanyService::new(companies.clone(), users, identity);
        let panel_service = PanelService::new(companies, company_info, attendants);

        Ok(Self {
            auth_service,
            company_service,
            panel_service,
            i18n_store: I18nStore::load()?,
        })
    }
}

// src/db/user_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::user::{NewProfile, Profile, Role},
};

const PROFILE_COLUMNS: &str =
    "id, email, nome, perfil, empresa_id, precisa_trocar_senha, criado_em";

// O repositório de perfis, responsável pela tabela 'usuarios'
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Profile>, AppError>;

    /// O administrador responsável por uma empresa, se houver.
    async fn find_company_admin(&self, company_id: i64) -> Result<Option<Profile>, AppError>;

    async fn create(&self, profile: &NewProfile) -> Result<Profile, AppError>;

    async fn set_must_change_password(&self, email: &str, value: bool) -> Result<u64, AppError>;

    async fn delete_by_company(&self, company_id: i64) -> Result<u64, AppError>;
}

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Profile>, AppError> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {} FROM usuarios WHERE email = $1 LIMIT 1",
            PROFILE_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn find_company_admin(&self, company_id: i64) -> Result<Option<Profile>, AppError> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            r#"
            SELECT {} FROM usuarios
            WHERE empresa_id = $1 AND perfil = $2
            ORDER BY criado_em
            LIMIT 1
            "#,
            PROFILE_COLUMNS
        ))
        .bind(company_id)
        .bind(Role::AdminEmpresa.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn create(&self, profile: &NewProfile) -> Result<Profile, AppError> {
        sqlx::query_as::<_, Profile>(&format!(
            r#"
            INSERT INTO usuarios (email, nome, perfil, empresa_id, precisa_trocar_senha)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        ))
        .bind(&profile.email)
        .bind(&profile.name)
        .bind(profile.role.as_str())
        .bind(profile.company_id)
        .bind(profile.must_change_password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // Converte violação de chave única em um erro mais amigável
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::ProfileAlreadyExists(profile.email.clone());
                }
            }
            e.into()
        })
    }

    async fn set_must_change_password(&self, email: &str, value: bool) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE usuarios SET precisa_trocar_senha = $2 WHERE email = $1")
            .bind(email)
            .bind(value)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete_by_company(&self, company_id: i64) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM usuarios WHERE empresa_id = $1")
            .bind(company_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

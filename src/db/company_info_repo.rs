// src/db/company_info_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::company_info::{CompanyInfo, CompanyInfoPayload},
};

const INFO_COLUMNS: &str = "id, empresa_id, chave, valor, descricao, criado_em";

// Tabela `informacoes_empresa`. Toda operação é escopada pela empresa dona.
#[async_trait]
pub trait CompanyInfoRepository: Send + Sync {
    /// Mais recentes primeiro.
    async fn list_by_company(&self, company_id: i64) -> Result<Vec<CompanyInfo>, AppError>;

    async fn create(
        &self,
        company_id: i64,
        info: &CompanyInfoPayload,
    ) -> Result<CompanyInfo, AppError>;

    async fn update(
        &self,
        company_id: i64,
        id: Uuid,
        info: &CompanyInfoPayload,
    ) -> Result<Option<CompanyInfo>, AppError>;

    async fn delete(&self, company_id: i64, id: Uuid) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct PgCompanyInfoRepository {
    pool: PgPool,
}

impl PgCompanyInfoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CompanyInfoRepository for PgCompanyInfoRepository {
    async fn list_by_company(&self, company_id: i64) -> Result<Vec<CompanyInfo>, AppError> {
        let entries = sqlx::query_as::<_, CompanyInfo>(&format!(
            "SELECT {} FROM informacoes_empresa WHERE empresa_id = $1 ORDER BY criado_em DESC",
            INFO_COLUMNS
        ))
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    async fn create(
        &self,
        company_id: i64,
        info: &CompanyInfoPayload,
    ) -> Result<CompanyInfo, AppError> {
        let entry = sqlx::query_as::<_, CompanyInfo>(&format!(
            r#"
            INSERT INTO informacoes_empresa (empresa_id, chave, valor, descricao)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            INFO_COLUMNS
        ))
        .bind(company_id)
        .bind(&info.key)
        .bind(&info.value)
        .bind(&info.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(entry)
    }

    async fn update(
        &self,
        company_id: i64,
        id: Uuid,
        info: &CompanyInfoPayload,
    ) -> Result<Option<CompanyInfo>, AppError> {
        let entry = sqlx::query_as::<_, CompanyInfo>(&format!(
            r#"
            UPDATE informacoes_empresa
            SET chave = $3, valor = $4, descricao = $5
            WHERE id = $1 AND empresa_id = $2
            RETURNING {}
            "#,
            INFO_COLUMNS
        ))
        .bind(id)
        .bind(company_id)
        .bind(&info.key)
        .bind(&info.value)
        .bind(&info.description)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    async fn delete(&self, company_id: i64, id: Uuid) -> Result<bool, AppError> {
        let result =
            sqlx::query("DELETE FROM informacoes_empresa WHERE id = $1 AND empresa_id = $2")
                .bind(id)
                .bind(company_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }
}

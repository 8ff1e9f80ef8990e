// src/db/company_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::company::{Company, NewCompany},
};

const COMPANY_COLUMNS: &str = "id, nome, estado, telefone, dominio, nome_responsavel, cnpj, \
     pagamento_ok, plano, vencimento, situacao, criado_em";

// Acesso à tabela `empresas`
#[async_trait]
pub trait CompanyRepository: Send + Sync {
    async fn list_all(&self) -> Result<Vec<Company>, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Company>, AppError>;

    async fn create(&self, company: &NewCompany) -> Result<Company, AppError>;

    async fn update(&self, id: i64, company: &NewCompany) -> Result<Option<Company>, AppError>;

    async fn update_phone(&self, id: i64, phone: &str) -> Result<Option<Company>, AppError>;

    /// Retorna `false` se a empresa não existia.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct PgCompanyRepository {
    pool: PgPool,
}

impl PgCompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CompanyRepository for PgCompanyRepository {
    async fn list_all(&self) -> Result<Vec<Company>, AppError> {
        let companies = sqlx::query_as::<_, Company>(&format!(
            "SELECT {} FROM empresas ORDER BY id",
            COMPANY_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(companies)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Company>, AppError> {
        let company = sqlx::query_as::<_, Company>(&format!(
            "SELECT {} FROM empresas WHERE id = $1",
            COMPANY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(company)
    }

    async fn create(&self, company: &NewCompany) -> Result<Company, AppError> {
        let created = sqlx::query_as::<_, Company>(&format!(
            r#"
            INSERT INTO empresas
                (nome, estado, telefone, dominio, nome_responsavel, cnpj,
                 pagamento_ok, plano, vencimento, situacao, criado_em)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            COMPANY_COLUMNS
        ))
        .bind(&company.name)
        .bind(&company.state)
        .bind(&company.phone)
        .bind(&company.domain)
        .bind(&company.responsible_name)
        .bind(&company.cnpj)
        .bind(company.payment_ok)
        .bind(company.plan)
        .bind(company.due_day)
        .bind(company.status)
        .bind(company.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn update(&self, id: i64, company: &NewCompany) -> Result<Option<Company>, AppError> {
        let updated = sqlx::query_as::<_, Company>(&format!(
            r#"
            UPDATE empresas SET
                nome = $2,
                estado = $3,
                telefone = $4,
                dominio = $5,
                nome_responsavel = $6,
                cnpj = $7,
                pagamento_ok = $8,
                plano = $9,
                vencimento = $10,
                situacao = $11,
                criado_em = $12
            WHERE id = $1
            RETURNING {}
            "#,
            COMPANY_COLUMNS
        ))
        .bind(id)
        .bind(&company.name)
        .bind(&company.state)
        .bind(&company.phone)
        .bind(&company.domain)
        .bind(&company.responsible_name)
        .bind(&company.cnpj)
        .bind(company.payment_ok)
        .bind(company.plan)
        .bind(company.due_day)
        .bind(company.status)
        .bind(company.created_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn update_phone(&self, id: i64, phone: &str) -> Result<Option<Company>, AppError> {
        let updated = sqlx::query_as::<_, Company>(&format!(
            "UPDATE empresas SET telefone = $2 WHERE id = $1 RETURNING {}",
            COMPANY_COLUMNS
        ))
        .bind(id)
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM empresas WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// src/db/attendant_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::attendant::{Attendant, AttendantPayload},
};

const ATTENDANT_COLUMNS: &str =
    "id, empresa_id, nome, estilo_personalidade, dialeto, criado_em";

#[async_trait]
pub trait AttendantRepository: Send + Sync {
    async fn list_by_company(&self, company_id: i64) -> Result<Vec<Attendant>, AppError>;

    async fn create(
        &self,
        company_id: i64,
        attendant: &AttendantPayload,
    ) -> Result<Attendant, AppError>;

    async fn update(
        &self,
        company_id: i64,
        id: Uuid,
        attendant: &AttendantPayload,
    ) -> Result<Option<Attendant>, AppError>;

    async fn delete(&self, company_id: i64, id: Uuid) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct PgAttendantRepository {
    pool: PgPool,
}

impl PgAttendantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttendantRepository for PgAttendantRepository {
    async fn list_by_company(&self, company_id: i64) -> Result<Vec<Attendant>, AppError> {
        let attendants = sqlx::query_as::<_, Attendant>(&format!(
            "SELECT {} FROM atendentes WHERE empresa_id = $1 ORDER BY criado_em DESC",
            ATTENDANT_COLUMNS
        ))
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(attendants)
    }

    async fn create(
        &self,
        company_id: i64,
        attendant: &AttendantPayload,
    ) -> Result<Attendant, AppError> {
        let created = sqlx::query_as::<_, Attendant>(&format!(
            r#"
            INSERT INTO atendentes (empresa_id, nome, estilo_personalidade, dialeto)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            ATTENDANT_COLUMNS
        ))
        .bind(company_id)
        .bind(&attendant.name)
        .bind(&attendant.personality_style)
        .bind(&attendant.dialect)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn update(
        &self,
        company_id: i64,
        id: Uuid,
        attendant: &AttendantPayload,
    ) -> Result<Option<Attendant>, AppError> {
        let updated = sqlx::query_as::<_, Attendant>(&format!(
            r#"
            UPDATE atendentes
            SET nome = $3, estilo_personalidade = $4, dialeto = $5
            WHERE id = $1 AND empresa_id = $2
            RETURNING {}
            "#,
            ATTENDANT_COLUMNS
        ))
        .bind(id)
        .bind(company_id)
        .bind(&attendant.name)
        .bind(&attendant.personality_style)
        .bind(&attendant.dialect)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn delete(&self, company_id: i64, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM atendentes WHERE id = $1 AND empresa_id = $2")
            .bind(id)
            .bind(company_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

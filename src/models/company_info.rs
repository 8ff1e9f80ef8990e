// src/models/company_info.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::validation::validate_not_blank;

// Par chave/valor com descrição, consumido por um sistema externo (o atendente virtual).
#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInfo {
    pub id: Uuid,

    #[sqlx(rename = "empresa_id")]
    pub company_id: i64,

    #[sqlx(rename = "chave")]
    #[schema(example = "horario_funcionamento")]
    pub key: String,

    #[sqlx(rename = "valor")]
    #[schema(example = "Seg a Sex, 8h às 18h")]
    pub value: String,

    #[sqlx(rename = "descricao")]
    #[schema(example = "Usar ao responder perguntas sobre horário de funcionamento")]
    pub description: String,

    #[sqlx(rename = "criado_em")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyInfoPayload {
    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "horario_funcionamento")]
    pub key: String,

    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "Seg a Sex, 8h às 18h")]
    pub value: String,

    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "Usar ao responder perguntas sobre horário de funcionamento")]
    pub description: String,
}

impl CompanyInfoPayload {
    pub fn trimmed(self) -> Self {
        Self {
            key: self.key.trim().to_string(),
            value: self.value.trim().to_string(),
            description: self.description.trim().to_string(),
        }
    }
}

// src/models/attendant.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::validation::validate_not_blank;

// Persona de atendente virtual de uma empresa
#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Attendant {
    pub id: Uuid,

    #[sqlx(rename = "empresa_id")]
    pub company_id: i64,

    #[sqlx(rename = "nome")]
    #[schema(example = "Bia")]
    pub name: String,

    #[sqlx(rename = "estilo_personalidade")]
    #[schema(example = "Amigável e prestativo")]
    pub personality_style: String,

    #[sqlx(rename = "dialeto")]
    #[schema(example = "Português informal do Brasil")]
    pub dialect: String,

    #[sqlx(rename = "criado_em")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct AttendantPayload {
    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "Bia")]
    pub name: String,

    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "Amigável e prestativo")]
    pub personality_style: String,

    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "Português informal do Brasil")]
    pub dialect: String,
}

impl AttendantPayload {
    pub fn trimmed(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            personality_style: self.personality_style.trim().to_string(),
            dialect: self.dialect.trim().to_string(),
        }
    }
}

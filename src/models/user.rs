// src/models/user.rs

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// ---
// Perfil de acesso
// ---
// No banco o perfil é texto livre; um valor desconhecido precisa ser
// carregável para que o login possa recusá-lo com a mensagem certa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    TupitecMaster,
    TupitecStaff,
    AdminEmpresa,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::TupitecMaster => "tupitec_master",
            Role::TupitecStaff => "tupitec_staff",
            Role::AdminEmpresa => "admin_empresa",
        }
    }

    /// Equipe da plataforma (acesso ao diretório de empresas).
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::TupitecMaster | Role::TupitecStaff)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "tupitec_master" => Ok(Role::TupitecMaster),
            "tupitec_staff" => Ok(Role::TupitecStaff),
            "admin_empresa" => Ok(Role::AdminEmpresa),
            other => Err(other.to_string()),
        }
    }
}

// ---
// Profile (linha da tabela `usuarios`)
// ---
// Registro da aplicação, distinto da conta no provedor de identidade.
// A ligação entre os dois é o e-mail.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Uuid,

    #[schema(example = "maria@paoquente.com.br")]
    pub email: String,

    #[sqlx(rename = "nome")]
    #[schema(example = "Maria Souza")]
    pub name: Option<String>,

    #[sqlx(rename = "perfil")]
    #[serde(rename = "role")]
    #[schema(example = "admin_empresa")]
    pub role_name: String,

    #[sqlx(rename = "empresa_id")]
    pub company_id: Option<i64>,

    #[sqlx(rename = "precisa_trocar_senha")]
    pub must_change_password: bool,

    #[sqlx(rename = "criado_em")]
    pub created_at: DateTime<Utc>,
}

impl Profile {
    pub fn role(&self) -> Result<Role, String> {
        self.role_name.parse()
    }
}

// Dados para inserir um novo perfil
#[derive(Debug, Clone, PartialEq)]
pub struct NewProfile {
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
    pub company_id: Option<i64>,
    pub must_change_password: bool,
}

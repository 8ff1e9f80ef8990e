// src/models/company.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        masks::{digits_only, format_cnpj, format_phone},
        validation::{validate_not_blank, validate_phone, validate_state},
    },
    models::user::Profile,
};

// ---
// Enums (mapeando os tipos do Postgres)
// ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "plano_empresa", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Free,
    Pro,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "situacao_empresa")]
pub enum CompanyStatus {
    #[sqlx(rename = "Ativo")]
    #[serde(rename = "Ativo")]
    Active,
    #[sqlx(rename = "Pendente")]
    #[serde(rename = "Pendente")]
    Pending,
    #[sqlx(rename = "Inativo")]
    #[serde(rename = "Inativo")]
    Inactive,
}

// ---
// Company (a "Empresa" cliente)
// ---
// Telefone e CNPJ ficam gravados apenas com dígitos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    #[schema(example = 42)]
    pub id: i64,

    #[sqlx(rename = "nome")]
    #[schema(example = "Padaria Pão Quente")]
    pub name: String,

    #[sqlx(rename = "estado")]
    #[schema(example = "São Paulo")]
    pub state: String,

    #[sqlx(rename = "telefone")]
    #[schema(example = "11987654321")]
    pub phone: String,

    #[sqlx(rename = "dominio")]
    #[schema(example = "paoquente.com.br")]
    pub domain: String,

    #[sqlx(rename = "nome_responsavel")]
    #[schema(example = "Maria Souza")]
    pub responsible_name: String,

    #[schema(example = "12345678000199")]
    pub cnpj: String,

    #[sqlx(rename = "pagamento_ok")]
    pub payment_ok: bool,

    #[sqlx(rename = "plano")]
    pub plan: Plan,

    #[sqlx(rename = "vencimento")]
    #[schema(example = 10)]
    pub due_day: i32,

    #[sqlx(rename = "situacao")]
    pub status: CompanyStatus,

    #[sqlx(rename = "criado_em")]
    pub created_at: NaiveDate,
}

// Resposta com as máscaras aplicadas para exibição
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyView {
    #[serde(flatten)]
    pub company: Company,

    #[schema(example = "(11) 98765-4321")]
    pub phone_formatted: String,

    #[schema(example = "12.345.678/0001-99")]
    pub cnpj_formatted: String,
}

impl From<Company> for CompanyView {
    fn from(company: Company) -> Self {
        let phone_formatted = format_phone(&company.phone);
        let cnpj_formatted = format_cnpj(&company.cnpj);
        Self {
            company,
            phone_formatted,
            cnpj_formatted,
        }
    }
}

// ---
// O "formulário" de criação/edição
// ---
// Campos ausentes viram vazios para cair na validação de obrigatórios.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyDraft {
    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "Padaria Pão Quente")]
    pub name: String,

    #[validate(length(min = 1, message = "required"), custom(function = "validate_state"))]
    #[schema(example = "São Paulo")]
    pub state: String,

    // Aceita com ou sem máscara
    #[validate(length(min = 1, message = "required"), custom(function = "validate_phone"))]
    #[schema(example = "(11) 98765-4321")]
    pub phone: String,

    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "paoquente.com.br")]
    pub domain: String,

    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "Maria Souza")]
    pub responsible_name: String,

    #[schema(example = "12.345.678/0001-99")]
    pub cnpj: String,

    pub payment_ok: bool,

    #[validate(required(message = "required"))]
    pub plan: Option<Plan>,

    #[validate(required(message = "required"))]
    pub status: Option<CompanyStatus>,

    #[validate(
        required(message = "required"),
        range(min = 1, max = 31, message = "due_day_range")
    )]
    #[schema(example = 10)]
    pub due_day: Option<i32>,

    // Se ausente, assume a data de hoje
    pub created_at: Option<NaiveDate>,
}

// O que de fato vai para o banco, já validado e sem máscaras.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCompany {
    pub name: String,
    pub state: String,
    pub phone: String,
    pub domain: String,
    pub responsible_name: String,
    pub cnpj: String,
    pub payment_ok: bool,
    pub plan: Plan,
    pub due_day: i32,
    pub status: CompanyStatus,
    pub created_at: NaiveDate,
}

impl CompanyDraft {
    /// Valida os obrigatórios e remove as máscaras de telefone e CNPJ.
    pub fn into_new_company(self, today: NaiveDate) -> Result<NewCompany, AppError> {
        self.validate()?;

        // Após o validate() os opcionais obrigatórios estão presentes.
        let (Some(plan), Some(status), Some(due_day)) = (self.plan, self.status, self.due_day)
        else {
            return Err(anyhow::anyhow!("Rascunho de empresa validado sem plano/situação/vencimento").into());
        };

        Ok(NewCompany {
            name: self.name.trim().to_string(),
            state: self.state,
            phone: digits_only(&self.phone),
            domain: self.domain.trim().to_string(),
            responsible_name: self.responsible_name.trim().to_string(),
            cnpj: digits_only(&self.cnpj),
            payment_ok: self.payment_ok,
            plan,
            due_day,
            status,
            created_at: self.created_at.unwrap_or(today),
        })
    }
}

// ---
// Criação em duas etapas (empresa + acesso do responsável)
// ---

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ResponsiblePayload {
    #[validate(email(message = "email"))]
    #[schema(example = "maria@paoquente.com.br")]
    pub email: String,

    // Se ausente, usa o nome do responsável da empresa
    #[schema(example = "Maria Souza")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateCompanyPayload {
    #[validate(nested)]
    pub company: CompanyDraft,

    #[validate(nested)]
    pub responsible: ResponsiblePayload,
}

// Situação da conta no provedor de identidade após a criação
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum AuthAccountStatus {
    Created,
    AlreadyExisted,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedCompany {
    pub company: CompanyView,
    pub profile: Profile,
    pub auth_account: AuthAccountStatus,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDetail {
    pub company: CompanyView,
    // E-mail do admin_empresa vinculado, se houver
    pub responsible_email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct PhoneUpdatePayload {
    #[schema(example = "(11) 3333-4444")]
    pub phone: String,
}

/// Ordena deixando as empresas com pagamento pendente primeiro.
/// A ordenação é estável, então a ordem do banco se mantém dentro de cada grupo.
pub fn sort_unpaid_first(companies: &mut [Company]) {
    companies.sort_by_key(|c| c.payment_ok);
}

// src/services/company_service.rs

use std::sync::Arc;

use chrono::NaiveDate;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::{CompanyRepository, UserRepository},
    models::{
        auth::ProvisionOutcome,
        company::{
            sort_unpaid_first, AuthAccountStatus, CompanyDetail, CompanyDraft, CompanyView,
            CreateCompanyPayload, CreatedCompany,
        },
        user::{NewProfile, Role},
    },
    services::identity::IdentityProvider,
};

// Senha inicial quando a empresa não tem telefone
const FALLBACK_PASSWORD: &str = "12345678";

// Diretório de empresas usado pela equipe da plataforma
#[derive(Clone)]
pub struct CompanyService {
    companies: Arc<dyn CompanyRepository>,
    users: Arc<dyn UserRepository>,
    identity: Arc<dyn IdentityProvider>,
}

impl CompanyService {
    pub fn new(
        companies: Arc<dyn CompanyRepository>,
        users: Arc<dyn UserRepository>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            companies,
            users,
            identity,
        }
    }

    /// Todas as empresas, com as inadimplentes no topo.
    pub async fn list(&self) -> Result<Vec<CompanyView>, AppError> {
        let mut companies = self.companies.list_all().await?;
        sort_unpaid_first(&mut companies);
        Ok(companies.into_iter().map(CompanyView::from).collect())
    }

    pub async fn get(&self, id: i64) -> Result<CompanyDetail, AppError> {
        let company = self
            .companies
            .find_by_id(id)
            .await?
            .ok_or(AppError::CompanyNotFound)?;

        let responsible_email = self
            .users
            .find_company_admin(id)
            .await?
            .map(|profile| profile.email);

        Ok(CompanyDetail {
            company: company.into(),
            responsible_email,
        })
    }

    /// Cria a empresa, a conta do responsável no provedor e o perfil
    /// `admin_empresa`, nessa ordem.
    ///
    /// Não há transação entre as etapas: se uma etapa posterior falhar, as
    /// anteriores permanecem e a falha fica registrada no log.
    pub async fn create(
        &self,
        payload: CreateCompanyPayload,
        today: NaiveDate,
    ) -> Result<CreatedCompany, AppError> {
        payload.validate()?;

        let CreateCompanyPayload {
            company: draft,
            responsible,
        } = payload;
        let new_company = draft.into_new_company(today)?;

        // 1. Empresa
        let company = self.companies.create(&new_company).await?;
        tracing::info!("Empresa {} ('{}') criada", company.id, company.name);

        // 2. Conta no provedor. A senha inicial são os dígitos do telefone,
        // e o perfil já nasce obrigado a trocá-la.
        let email = responsible.email.trim().to_string();
        let password = if company.phone.is_empty() {
            FALLBACK_PASSWORD
        } else {
            company.phone.as_str()
        };
        let auth_account = match self.identity.admin_create_user(&email, password).await {
            Ok(ProvisionOutcome::Created(_)) => AuthAccountStatus::Created,
            Ok(ProvisionOutcome::AlreadyExists) => {
                tracing::warn!(
                    "Conta de {} já existia no provedor; seguindo com o perfil da empresa {}",
                    email,
                    company.id
                );
                AuthAccountStatus::AlreadyExisted
            }
            Err(e) => {
                tracing::error!(
                    "Empresa {} criada sem conta de acesso para {}: {}",
                    company.id,
                    email,
                    e
                );
                return Err(match e {
                    AppError::AuthProvisioningFailed(_) => e,
                    other => AppError::AuthProvisioningFailed(other.to_string()),
                });
            }
        };

        // 3. Perfil da aplicação
        let name = responsible
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| company.responsible_name.clone());

        let profile = self
            .users
            .create(&NewProfile {
                email: email.clone(),
                name: Some(name),
                role: Role::AdminEmpresa,
                company_id: Some(company.id),
                must_change_password: true,
            })
            .await
            .map_err(|e| {
                tracing::error!(
                    "Empresa {} e conta de {} criadas, mas o perfil não: {}",
                    company.id,
                    email,
                    e
                );
                e
            })?;

        Ok(CreatedCompany {
            company: company.into(),
            profile,
            auth_account,
        })
    }

    pub async fn update(&self, id: i64, draft: CompanyDraft) -> Result<CompanyView, AppError> {
        let existing = self
            .companies
            .find_by_id(id)
            .await?
            .ok_or(AppError::CompanyNotFound)?;

        // Sem data informada, preserva a data de criação original
        let changes = draft.into_new_company(existing.created_at)?;

        self.companies
            .update(id, &changes)
            .await?
            .map(CompanyView::from)
            .ok_or(AppError::CompanyNotFound)
    }

    /// Remove os perfis vinculados e depois a empresa.
    ///
    /// As contas no provedor de identidade não são removidas.
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        if self.companies.find_by_id(id).await?.is_none() {
            return Err(AppError::CompanyNotFound);
        }

        let removed = self.users.delete_by_company(id).await?;

        if !self.companies.delete(id).await? {
            return Err(AppError::CompanyNotFound);
        }

        tracing::warn!(
            "Empresa {} removida junto com {} perfil(is); as contas no provedor de identidade continuam ativas",
            id,
            removed
        );
        Ok(())
    }
}

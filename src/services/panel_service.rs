// src/services/panel_service.rs

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        masks::{digits_only, is_valid_phone},
    },
    db::{AttendantRepository, CompanyInfoRepository, CompanyRepository},
    models::{
        attendant::{Attendant, AttendantPayload},
        company::CompanyView,
        company_info::{CompanyInfo, CompanyInfoPayload},
    },
};

const INFO_RESOURCE: &str = "Informação";
const ATTENDANT_RESOURCE: &str = "Atendente";

// Painel do admin_empresa. Toda operação recebe o `company_id` resolvido a
// partir do perfil autenticado, nunca do cliente.
#[derive(Clone)]
pub struct PanelService {
    companies: Arc<dyn CompanyRepository>,
    company_info: Arc<dyn CompanyInfoRepository>,
    attendants: Arc<dyn AttendantRepository>,
}

impl PanelService {
    pub fn new(
        companies: Arc<dyn CompanyRepository>,
        company_info: Arc<dyn CompanyInfoRepository>,
        attendants: Arc<dyn AttendantRepository>,
    ) -> Self {
        Self {
            companies,
            company_info,
            attendants,
        }
    }

    pub async fn company(&self, company_id: i64) -> Result<CompanyView, AppError> {
        self.companies
            .find_by_id(company_id)
            .await?
            .map(CompanyView::from)
            .ok_or(AppError::CompanyNotFound)
    }

    /// O único campo da empresa que o próprio cliente pode editar.
    pub async fn update_phone(&self, company_id: i64, phone: &str) -> Result<CompanyView, AppError> {
        if !is_valid_phone(phone) {
            return Err(AppError::InvalidPhone);
        }

        self.companies
            .update_phone(company_id, &digits_only(phone))
            .await?
            .map(CompanyView::from)
            .ok_or(AppError::CompanyNotFound)
    }

    // --- Informações ---

    pub async fn list_info(&self, company_id: i64) -> Result<Vec<CompanyInfo>, AppError> {
        self.company_info.list_by_company(company_id).await
    }

    pub async fn create_info(
        &self,
        company_id: i64,
        payload: CompanyInfoPayload,
    ) -> Result<CompanyInfo, AppError> {
        payload.validate()?;
        self.company_info
            .create(company_id, &payload.trimmed())
            .await
    }

    pub async fn update_info(
        &self,
        company_id: i64,
        id: Uuid,
        payload: CompanyInfoPayload,
    ) -> Result<CompanyInfo, AppError> {
        payload.validate()?;
        self.company_info
            .update(company_id, id, &payload.trimmed())
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(INFO_RESOURCE.to_string()))
    }

    pub async fn delete_info(&self, company_id: i64, id: Uuid) -> Result<(), AppError> {
        if !self.company_info.delete(company_id, id).await? {
            return Err(AppError::ResourceNotFound(INFO_RESOURCE.to_string()));
        }
        Ok(())
    }

    // --- Atendentes ---

    pub async fn list_attendants(&self, company_id: i64) -> Result<Vec<Attendant>, AppError> {
        self.attendants.list_by_company(company_id).await
    }

    pub async fn create_attendant(
        &self,
        company_id: i64,
        payload: AttendantPayload,
    ) -> Result<Attendant, AppError> {
        payload.validate()?;
        self.attendants.create(company_id, &payload.trimmed()).await
    }

    pub async fn update_attendant(
        &self,
        company_id: i64,
        id: Uuid,
        payload: AttendantPayload,
    ) -> Result<Attendant, AppError> {
        payload.validate()?;
        self.attendants
            .update(company_id, id, &payload.trimmed())
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(ATTENDANT_RESOURCE.to_string()))
    }

    pub async fn delete_attendant(&self, company_id: i64, id: Uuid) -> Result<(), AppError> {
        if !self.attendants.delete(company_id, id).await? {
            return Err(AppError::ResourceNotFound(ATTENDANT_RESOURCE.to_string()));
        }
        Ok(())
    }
}

pub mod auth;
pub mod company_service;
pub mod identity;
pub mod panel_service;

pub mod attendant;
pub mod auth;
pub mod company;
pub mod company_info;
pub mod user;

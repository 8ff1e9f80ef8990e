pub mod auth;
pub mod companies;
pub mod panel;
pub mod provisioning;

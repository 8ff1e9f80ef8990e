pub mod attendant_repo;
pub use attendant_repo::{AttendantRepository, PgAttendantRepository};
pub mod company_info_repo;
pub use company_info_repo::{CompanyInfoRepository, PgCompanyInfoRepository};
pub mod company_repo;
pub use company_repo::{CompanyRepository, PgCompanyRepository};
pub mod user_repo;
pub use user_repo::{PgUserRepository, UserRepository};

pub mod backup_repo;
pub use backup_repo::BackupRepository;
pub mod export_repo;
pub use export_repo::ExportRepository;
pub mod fee_repo;
pub use fee_repo::FeeRepository;
pub mod lease_repo;
pub use lease_repo::LeaseRepository;
pub mod log_repo;
pub use log_repo::LogRepository;
pub mod payment_repo;
pub use payment_repo::PaymentRepository;
pub mod repair_repo;
pub use repair_repo::RepairRepository;
pub mod report_repo;
pub use report_repo::ReportRepository;
pub mod reserve_repo;
pub use reserve_repo::ReserveRepository;
pub mod session_repo;
pub use session_repo::SessionRepository;
pub mod tenant_repo;
pub use tenant_repo::TenantRepository;
pub mod unit_repo;
pub use unit_repo::UnitRepository;
pub mod user_repo;
pub use user_repo::UserRepository;

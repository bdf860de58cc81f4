pub mod audit_service;
pub mod auth;
pub mod backup_service;
pub mod export_service;
pub mod fee_service;
pub mod lease_service;
pub mod payment_service;
pub mod repair_service;
pub mod report_service;
pub mod reserve_service;
pub mod tenant_service;
pub mod unit_service;
pub mod user_service;

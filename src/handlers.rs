pub mod audit;
pub mod auth;
pub mod backups;
pub mod export;
pub mod fees;
pub mod leases;
pub mod payments;
pub mod reports;
pub mod repairs;
pub mod reserves;
pub mod tenants;
pub mod units;
pub mod users;

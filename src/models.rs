pub mod audit;
pub mod auth;
pub mod backup;
pub mod common;
pub mod export;
pub mod fee;
pub mod lease;
pub mod payment;
pub mod repair;
pub mod report;
pub mod reserve;
pub mod tenant;
pub mod unit;

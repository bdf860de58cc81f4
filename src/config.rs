// src/config.rs

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, path::PathBuf, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;

use crate::{
    common::i18n::I18nStore,
    db::{
        BackupRepository, ExportRepository, FeeRepository, LeaseRepository, LogRepository,
        PaymentRepository, RepairRepository, ReportRepository, ReserveRepository,
        SessionRepository, TenantRepository, UnitRepository, UserRepository,
    },
    services::{
        audit_service::AuditService, auth::AuthService, backup_service::BackupService,
        export_service::ExportService, fee_service::FeeService, lease_service::LeaseService,
        payment_service::PaymentService, repair_service::RepairService,
        report_service::ReportService, reserve_service::ReserveService,
        tenant_service::TenantService, unit_service::UnitService, user_service::UserService,
    },
};

// Configuração lida do ambiente (.env)
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub bind_addr: String,
    pub session_timeout_secs: i64,
    pub cookie_secure: bool,
    /// Só atrás de proxy reverso confiável o x-forwarded-for vale como IP do cliente
    pub trust_proxy: bool,
    pub upload_dir: PathBuf,
    pub backup_dir: PathBuf,
    pub max_backup_files: usize,
    pub db_max_connections: u32,
    /// Administrador criado no primeiro boot, se não houver usuários
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            bind_addr: "0.0.0.0:3000".into(),
            session_timeout_secs: 3600,
            cookie_secure: true,
            trust_proxy: false,
            upload_dir: PathBuf::from("./uploads/comprobantes"),
            backup_dir: PathBuf::from("./backups"),
            max_backup_files: 10,
            db_max_connections: 5,
            admin_email: None,
            admin_password: None,
        }
    }
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} inválida: '{}'", name, raw)),
        Err(_) => Ok(default),
    }
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Settings::default();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?,
            bind_addr: env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            session_timeout_secs: parse_var("SESSION_TIMEOUT_SECS", defaults.session_timeout_secs)?,
            cookie_secure: parse_var("COOKIE_SECURE", defaults.cookie_secure)?,
            trust_proxy: parse_var("TRUST_PROXY", defaults.trust_proxy)?,
            upload_dir: env::var("UPLOAD_DIR").map(PathBuf::from).unwrap_or(defaults.upload_dir),
            backup_dir: env::var("BACKUP_DIR").map(PathBuf::from).unwrap_or(defaults.backup_dir),
            max_backup_files: parse_var("MAX_BACKUP_FILES", defaults.max_backup_files)?,
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
            admin_email: env::var("ADMIN_EMAIL").ok().filter(|v| !v.trim().is_empty()),
            admin_password: env::var("ADMIN_PASSWORD").ok().filter(|v| !v.is_empty()),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub settings: Arc<Settings>,
    pub i18n_store: Arc<I18nStore>,
    pub auth_service: AuthService,
    pub audit_service: AuditService,
    pub user_service: UserService,
    pub unit_service: UnitService,
    pub tenant_service: TenantService,
    pub lease_service: LeaseService,
    pub fee_service: FeeService,
    pub payment_service: PaymentService,
    pub repair_service: RepairService,
    pub reserve_service: ReserveService,
    pub report_service: ReportService,
    pub export_service: ExportService,
    pub backup_service: BackupService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let settings = Settings::from_env()?;

        let db_pool = PgPoolOptions::new()
            .max_connections(settings.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&settings.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        let i18n_store = I18nStore::load_embedded()?;

        Ok(Self::from_parts(db_pool, settings, i18n_store))
    }

    /// Monta o gráfico de dependências a partir de um pool já criado.
    pub fn from_parts(db_pool: PgPool, settings: Settings, i18n_store: I18nStore) -> Self {
        let settings = Arc::new(settings);

        let user_repo = UserRepository::new(db_pool.clone());
        let session_repo = SessionRepository::new(db_pool.clone());
        let log_repo = LogRepository::new(db_pool.clone());
        let unit_repo = UnitRepository::new(db_pool.clone());
        let tenant_repo = TenantRepository::new(db_pool.clone());
        let lease_repo = LeaseRepository::new(db_pool.clone());
        let fee_repo = FeeRepository::new(db_pool.clone());
        let payment_repo = PaymentRepository::new(db_pool.clone());
        let repair_repo = RepairRepository::new(db_pool.clone());
        let reserve_repo = ReserveRepository::new(db_pool.clone());
        let report_repo = ReportRepository::new(db_pool.clone());
        let export_repo = ExportRepository::new(db_pool.clone());
        let backup_repo = BackupRepository::new(db_pool.clone());

        let audit_service = AuditService::new(log_repo.clone());

        Self {
            auth_service: AuthService::new(
                user_repo.clone(),
                session_repo.clone(),
                log_repo,
                settings.session_timeout_secs,
            ),
            user_service: UserService::new(db_pool.clone(), user_repo, session_repo),
            unit_service: UnitService::new(db_pool.clone(), unit_repo.clone(), lease_repo.clone()),
            tenant_service: TenantService::new(db_pool.clone(), tenant_repo),
            lease_service: LeaseService::new(db_pool.clone(), lease_repo.clone(), unit_repo),
            fee_service: FeeService::new(db_pool.clone(), fee_repo.clone()),
            payment_service: PaymentService::new(
                db_pool.clone(),
                payment_repo.clone(),
                fee_repo,
                lease_repo.clone(),
                settings.upload_dir.clone(),
            ),
            repair_service: RepairService::new(
                db_pool.clone(),
                repair_repo,
                reserve_repo.clone(),
                payment_repo,
                lease_repo.clone(),
            ),
            reserve_service: ReserveService::new(db_pool.clone(), reserve_repo),
            report_service: ReportService::new(report_repo, lease_repo),
            export_service: ExportService::new(export_repo),
            backup_service: BackupService::new(
                backup_repo,
                settings.backup_dir.clone(),
                settings.max_backup_files,
            ),
            audit_service,
            db_pool,
            settings,
            i18n_store: Arc::new(i18n_store),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.session_timeout_secs, 3600);
        assert_eq!(settings.max_backup_files, 10);
        assert!(settings.cookie_secure);
        assert!(!settings.trust_proxy);
    }
}

// src/services/audit_service.rs

use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{PageRequest, Paginated},
    },
    db::LogRepository,
    models::audit::{ClientInfo, LogQuery, SecurityLog, SystemLog},
};

#[derive(Clone)]
pub struct AuditService {
    log_repo: LogRepository,
}

impl AuditService {
    pub fn new(log_repo: LogRepository) -> Self {
        Self { log_repo }
    }

    /// Registra uma ação no log do sistema. Falhas só vão para o tracing.
    pub async fn record(
        &self,
        user_id: Uuid,
        action: &str,
        table_name: &str,
        record_id: Option<String>,
        client: &ClientInfo,
    ) {
        if let Err(e) = self
            .log_repo
            .insert_system_log(
                Some(user_id),
                action,
                Some(table_name),
                record_id.as_deref(),
                client.ip.as_deref(),
                client.user_agent.as_deref(),
            )
            .await
        {
            tracing::error!("Falha ao gravar log do sistema ({} em {}): {}", action, table_name, e);
        }
    }

    pub async fn system_logs(&self, query: &LogQuery) -> Result<Paginated<SystemLog>, AppError> {
        let page = PageRequest::new(query.page, query.per_page);
        let (items, total) = self.log_repo.list_system_logs(page).await?;
        Ok(Paginated::new(items, total, page))
    }

    pub async fn security_logs(&self, query: &LogQuery) -> Result<Paginated<SecurityLog>, AppError> {
        let page = PageRequest::new(query.page, query.per_page);
        let (items, total) = self.log_repo.list_security_logs(page).await?;
        Ok(Paginated::new(items, total, page))
    }
}

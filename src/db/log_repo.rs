// src/db/log_repo.rs

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::PageRequest},
    models::audit::{SecurityLog, SystemLog},
};

// Tabelas `system_logs` (ações) e `security_logs` (eventos de autenticação)
#[derive(Clone)]
pub struct LogRepository {
    pool: PgPool,
}

impl LogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert_system_log(
        &self,
        user_id: Option<Uuid>,
        action: &str,
        table_name: Option<&str>,
        record_id: Option<&str>,
        ip: Option<&str>,
        user_agent: Option<&str>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO system_logs (user_id, action, table_name, record_id, ip, user_agent)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user_id)
        .bind(action)
        .bind(table_name)
        .bind(record_id)
        .bind(ip)
        .bind(user_agent)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn insert_security_event(
        &self,
        user_id: Option<Uuid>,
        event: &str,
        event_type: &str,
        ip: Option<&str>,
        user_agent: Option<&str>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO security_logs (user_id, event, event_type, ip, user_agent)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user_id)
        .bind(event)
        .bind(event_type)
        .bind(ip)
        .bind(user_agent)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn count_security_events_since(
        &self,
        ip: &str,
        event_type: &str,
        since: DateTime<Utc>,
    ) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM security_logs
            WHERE ip = $1 AND event_type = $2 AND created_at > $3
            "#,
        )
        .bind(ip)
        .bind(event_type)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    pub async fn list_system_logs(&self, page: PageRequest) -> Result<(Vec<SystemLog>, i64), AppError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM system_logs")
            .fetch_one(&self.pool)
            .await?;
        let logs = sqlx::query_as::<_, SystemLog>(
            r#"
            SELECT l.id, l.user_id, u.email AS user_email, l.action, l.table_name,
                   l.record_id, l.ip, l.user_agent, l.created_at
            FROM system_logs l
            LEFT JOIN users u ON u.id = l.user_id
            ORDER BY l.created_at DESC, l.id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        Ok((logs, total))
    }

    pub async fn list_security_logs(&self, page: PageRequest) -> Result<(Vec<SecurityLog>, i64), AppError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM security_logs")
            .fetch_one(&self.pool)
            .await?;
        let logs = sqlx::query_as::<_, SecurityLog>(
            "SELECT * FROM security_logs ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        Ok((logs, total))
    }
}

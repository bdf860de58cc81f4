// src/db/backup_repo.rs

use sqlx::PgPool;

use crate::common::error::AppError;

/// Tabelas copiadas, na ordem em que podem ser restauradas (pais antes dos filhos).
/// Sessões ficam de fora.
pub const BACKUP_TABLES: &[&str] = &[
    "users",
    "buildings",
    "units",
    "tenants",
    "leases",
    "expense_categories",
    "fees",
    "fee_items",
    "payments",
    "repairs",
    "reserves",
    "system_logs",
    "security_logs",
    "exports",
];

#[derive(Clone)]
pub struct BackupRepository {
    pool: PgPool,
}

impl BackupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn current_database(&self) -> Result<String, AppError> {
        let name: String = sqlx::query_scalar("SELECT current_database()")
            .fetch_one(&self.pool)
            .await?;
        Ok(name)
    }

    /// Cada linha da tabela serializada como JSON. `table` deve vir de `BACKUP_TABLES`.
    pub async fn dump_table(&self, table: &str) -> Result<Vec<String>, AppError> {
        let sql = format!("SELECT row_to_json(t)::text FROM {} t", table);
        let rows: Vec<String> = sqlx::query_scalar(&sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }
}

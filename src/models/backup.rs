// src/models/backup.rs

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BackupFile {
    #[schema(example = "backup_alquileres_2025-06-01_031500.sql.gz")]
    pub name: String,
    pub size_bytes: u64,
    /// Data extraída do nome do arquivo
    pub created_at: NaiveDateTime,
    pub compressed: bool,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateBackupPayload {
    #[serde(default)]
    pub compress: bool,
}

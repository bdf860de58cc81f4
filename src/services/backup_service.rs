// src/services/backup_service.rs

use std::{
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{Local, NaiveDateTime};
use flate2::{write::GzEncoder, Compression};

use crate::{
    common::error::AppError,
    db::{backup_repo::BACKUP_TABLES, BackupRepository},
    models::backup::BackupFile,
};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H%M%S";
// "2025-06-01_031500"
const TIMESTAMP_LEN: usize = 17;

// Tabelas com BIGSERIAL, cuja sequência é reposicionada após a carga
const SERIAL_TABLES: &[&str] = &["system_logs", "security_logs"];

/// Nome do banco reduzido a [A-Za-z0-9_-].
fn sanitize_db_name(db_name: &str) -> String {
    let cleaned: String = db_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() { "db".into() } else { cleaned }
}

pub fn backup_file_name(db_name: &str, now: NaiveDateTime, compressed: bool) -> String {
    format!(
        "backup_{}_{}.sql{}",
        sanitize_db_name(db_name),
        now.format(TIMESTAMP_FORMAT),
        if compressed { ".gz" } else { "" }
    )
}

/// Valida o nome de um backup e extrai (data, compactado).
pub fn parse_backup_name(name: &str) -> Option<(NaiveDateTime, bool)> {
    let rest = name.strip_prefix("backup_")?;
    let (stem, compressed) = match rest.strip_suffix(".sql.gz") {
        Some(stem) => (stem, true),
        None => (rest.strip_suffix(".sql")?, false),
    };
    if !stem.is_ascii() || stem.len() < TIMESTAMP_LEN + 2 {
        return None;
    }

    let (db_part, timestamp) = stem.split_at(stem.len() - TIMESTAMP_LEN);
    let db_name = db_part.strip_suffix('_')?;
    let valid_db = !db_name.is_empty()
        && db_name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid_db {
        return None;
    }

    let created_at = NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT).ok()?;
    Some((created_at, compressed))
}

fn sql_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

pub fn insert_statement(table: &str, row_json: &str) -> String {
    format!(
        "INSERT INTO {table} SELECT * FROM json_populate_record(NULL::{table}, {});\n",
        sql_literal(row_json)
    )
}

/// Monta o script SQL completo a partir das linhas de cada tabela.
pub fn render_dump(db_name: &str, generated_at: NaiveDateTime, tables: &[(&str, Vec<String>)]) -> String {
    let mut sql = String::new();
    sql.push_str(&format!("-- Backup de la base de datos: {}\n", db_name));
    sql.push_str(&format!("-- Generado: {}\n\n", generated_at.format("%Y-%m-%d %H:%M:%S")));
    sql.push_str("BEGIN;\n\n");

    let names: Vec<&str> = tables.iter().map(|(name, _)| *name).collect();
    if !names.is_empty() {
        sql.push_str(&format!("TRUNCATE TABLE {} CASCADE;\n", names.join(", ")));
    }

    for (table, rows) in tables {
        sql.push_str(&format!("\n-- Tabla: {} ({} filas)\n", table, rows.len()));
        for row in rows {
            sql.push_str(&insert_statement(table, row));
        }
    }

    for table in SERIAL_TABLES.iter().filter(|t| names.contains(*t)) {
        sql.push_str(&format!(
            "\nSELECT setval(pg_get_serial_sequence('{table}', 'id'), COALESCE(MAX(id), 0) + 1, false) FROM {table};\n"
        ));
    }

    sql.push_str("\nCOMMIT;\n");
    sql
}

pub fn gzip(bytes: &[u8]) -> Result<Vec<u8>, AppError> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    Ok(encoder.finish()?)
}

/// Backups válidos do diretório, do mais recente para o mais antigo.
pub async fn list_backups(dir: &Path) -> Result<Vec<BackupFile>, AppError> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut backups = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        let Some((created_at, compressed)) = parse_backup_name(&name) else {
            continue;
        };
        let metadata = entry.metadata().await?;
        if !metadata.is_file() {
            continue;
        }
        backups.push(BackupFile {
            name,
            size_bytes: metadata.len(),
            created_at,
            compressed,
        });
    }

    backups.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.name.cmp(&a.name)));
    Ok(backups)
}

/// Mantém só os `keep` backups mais recentes. Devolve os nomes removidos.
pub async fn prune_backups(dir: &Path, keep: usize) -> Result<Vec<String>, AppError> {
    let mut removed = Vec::new();
    for backup in list_backups(dir).await?.into_iter().skip(keep) {
        tokio::fs::remove_file(dir.join(&backup.name)).await?;
        removed.push(backup.name);
    }
    Ok(removed)
}

#[derive(Clone)]
pub struct BackupService {
    backup_repo: BackupRepository,
    backup_dir: PathBuf,
    max_files: usize,
}

impl BackupService {
    pub fn new(backup_repo: BackupRepository, backup_dir: PathBuf, max_files: usize) -> Self {
        Self { backup_repo, backup_dir, max_files }
    }

    // Só aceita nomes no padrão de backup, que não contêm separadores de caminho
    fn path_for(&self, name: &str) -> Result<PathBuf, AppError> {
        if parse_backup_name(name).is_none() {
            return Err(AppError::InvalidBackupName);
        }
        Ok(self.backup_dir.join(name))
    }

    pub async fn create(&self, compress: bool) -> Result<BackupFile, AppError> {
        let db_name = self.backup_repo.current_database().await?;
        let now = Local::now().naive_local();

        let mut tables = Vec::with_capacity(BACKUP_TABLES.len());
        for table in BACKUP_TABLES {
            let rows = self.backup_repo.dump_table(table).await?;
            tables.push((*table, rows));
        }

        let script = render_dump(&db_name, now, &tables);
        let bytes = if compress { gzip(script.as_bytes())? } else { script.into_bytes() };

        tokio::fs::create_dir_all(&self.backup_dir).await?;
        let name = backup_file_name(&db_name, now, compress);
        tokio::fs::write(self.backup_dir.join(&name), &bytes).await?;
        tracing::info!("💾 Backup criado: {} ({} bytes)", name, bytes.len());

        for removed in prune_backups(&self.backup_dir, self.max_files).await? {
            tracing::info!("🗑️ Backup antigo removido: {}", removed);
        }

        Ok(BackupFile {
            name,
            size_bytes: bytes.len() as u64,
            created_at: now,
            compressed: compress,
        })
    }

    pub async fn list(&self) -> Result<Vec<BackupFile>, AppError> {
        list_backups(&self.backup_dir).await
    }

    pub async fn read(&self, name: &str) -> Result<Vec<u8>, AppError> {
        let path = self.path_for(name)?;
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AppError::NotFound("backup")),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn delete(&self, name: &str) -> Result<(), AppError> {
        let path = self.path_for(name)?;
        match tokio::fs::remove_file(path).await {
            Ok(()) => {
                tracing::info!("🗑️ Backup removido: {}", name);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AppError::NotFound("backup")),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use flate2::read::GzDecoder;
    use rstest::rstest;
    use std::io::Read;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap().and_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn test_file_name_roundtrips_through_parser() {
        let name = backup_file_name("alquileres", at(3, 15, 0), true);
        assert_eq!(name, "backup_alquileres_2025-06-01_031500.sql.gz");
        assert_eq!(parse_backup_name(&name), Some((at(3, 15, 0), true)));

        let plain = backup_file_name("mi base", at(23, 59, 59), false);
        assert_eq!(plain, "backup_mi_base_2025-06-01_235959.sql");
        assert_eq!(parse_backup_name(&plain), Some((at(23, 59, 59), false)));
    }

    #[rstest]
    #[case("../etc/passwd")]
    #[case("backup_../../x_2025-06-01_031500.sql")]
    #[case("backup_db_2025-06-01_031500.txt")]
    #[case("backup__2025-06-01_031500.sql")]
    #[case("backup_db_2025-13-01_031500.sql")]
    #[case("backup_db/2025-06-01_031500.sql")]
    #[case("dump_db_2025-06-01_031500.sql")]
    fn test_rejects_invalid_names(#[case] name: &str) {
        assert!(parse_backup_name(name).is_none());
    }

    #[test]
    fn test_dump_escapes_quotes_and_wraps_in_transaction() {
        let rows = vec![r#"{"id":"1","name":"O'Brien"}"#.to_string()];
        let sql = render_dump("alquileres", at(3, 0, 0), &[("tenants", rows), ("system_logs", vec![])]);

        assert!(sql.starts_with("-- Backup de la base de datos: alquileres"));
        assert!(sql.contains("BEGIN;"));
        assert!(sql.contains("TRUNCATE TABLE tenants, system_logs CASCADE;"));
        assert!(sql.contains(
            r#"INSERT INTO tenants SELECT * FROM json_populate_record(NULL::tenants, '{"id":"1","name":"O''Brien"}');"#
        ));
        assert!(sql.contains("pg_get_serial_sequence('system_logs', 'id')"));
        assert!(sql.trim_end().ends_with("COMMIT;"));
    }

    #[test]
    fn test_gzip_output_decompresses() {
        let compressed = gzip(b"SELECT 1;").unwrap();
        let mut text = String::new();
        GzDecoder::new(compressed.as_slice()).read_to_string(&mut text).unwrap();
        assert_eq!(text, "SELECT 1;");
    }

    #[tokio::test]
    async fn test_list_and_prune_keep_most_recent() {
        let dir = tempfile::tempdir().unwrap();
        for (i, second) in [1u32, 2, 3, 4].iter().enumerate() {
            let name = backup_file_name("db", at(10, 0, *second), i % 2 == 0);
            std::fs::write(dir.path().join(name), b"--").unwrap();
        }
        std::fs::write(dir.path().join("notas.txt"), b"ignorado").unwrap();

        let listed = list_backups(dir.path()).await.unwrap();
        assert_eq!(listed.len(), 4);
        assert_eq!(listed[0].created_at, at(10, 0, 4));

        let removed = prune_backups(dir.path(), 2).await.unwrap();
        assert_eq!(removed.len(), 2);

        let remaining = list_backups(dir.path()).await.unwrap();
        let seconds: Vec<_> = remaining.iter().map(|b| b.created_at).collect();
        assert_eq!(seconds, vec![at(10, 0, 4), at(10, 0, 3)]);
        assert!(dir.path().join("notas.txt").exists());
    }

    #[tokio::test]
    async fn test_missing_directory_lists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let listed = list_backups(&dir.path().join("nao_existe")).await.unwrap();
        assert!(listed.is_empty());
    }
}

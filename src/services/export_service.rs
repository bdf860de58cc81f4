// src/services/export_service.rs

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ExportRepository,
    models::export::{ExportFormat, ExportQuery, ExportType},
};

// Arquivo pronto para download
#[derive(Debug)]
pub struct ExportFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
    pub rows: usize,
}

/// Serializa as linhas em CSV (com cabeçalho) ou JSON.
pub fn render<T: Serialize>(rows: &[T], format: ExportFormat) -> Result<Vec<u8>, AppError> {
    match format {
        ExportFormat::Csv => {
            let mut writer = csv::Writer::from_writer(Vec::new());
            for row in rows {
                writer.serialize(row)?;
            }
            writer
                .into_inner()
                .map_err(|e| AppError::InternalServerError(anyhow::anyhow!("Falha ao finalizar CSV: {}", e)))
        }
        ExportFormat::Json => serde_json::to_vec_pretty(rows).map_err(|e| anyhow::Error::from(e).into()),
    }
}

pub fn export_file_name(export_type: ExportType, format: ExportFormat, now: NaiveDateTime) -> String {
    format!(
        "{}_{}.{}",
        export_type.as_str(),
        now.format("%Y-%m-%d_%H%M%S"),
        format.extension()
    )
}

#[derive(Clone)]
pub struct ExportService {
    export_repo: ExportRepository,
}

impl ExportService {
    pub fn new(export_repo: ExportRepository) -> Self {
        Self { export_repo }
    }

    pub async fn export(&self, query: &ExportQuery, user_id: Uuid) -> Result<ExportFile, AppError> {
        let (from, to) = (query.date_from, query.date_to);

        let (bytes, rows) = match query.export_type {
            ExportType::Pagos => {
                let rows = self.export_repo.payments(from, to).await?;
                (render(&rows, query.format)?, rows.len())
            }
            ExportType::Expensas => {
                let rows = self.export_repo.fees(from, to).await?;
                (render(&rows, query.format)?, rows.len())
            }
            ExportType::Contratos => {
                let rows = self.export_repo.leases().await?;
                (render(&rows, query.format)?, rows.len())
            }
            ExportType::Reservas => {
                let rows = self.export_repo.reserves().await?;
                (render(&rows, query.format)?, rows.len())
            }
            ExportType::Reparaciones => {
                let rows = self.export_repo.repairs(from, to).await?;
                (render(&rows, query.format)?, rows.len())
            }
        };

        self.export_repo
            .record_export(user_id, query.export_type, query.format, rows)
            .await?;
        tracing::info!("📤 Exportação de {} ({} linhas)", query.export_type.as_str(), rows);

        Ok(ExportFile {
            file_name: export_file_name(query.export_type, query.format, Local::now().naive_local()),
            content_type: query.format.content_type(),
            bytes,
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        common::Currency,
        export::ReserveExportRow,
        reserve::{ReserveOrigin, ReserveStatus},
    };
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn rows() -> Vec<ReserveExportRow> {
        vec![ReserveExportRow {
            id: Uuid::nil(),
            description: "Fondo, \"obras\"".into(),
            amount: dec!(1000),
            currency: Currency::Usd,
            origin: ReserveOrigin::AporteExtra,
            status: ReserveStatus::Disponible,
            created_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        }]
    }

    #[test]
    fn test_csv_has_header_and_quoted_values() {
        let text = String::from_utf8(render(&rows(), ExportFormat::Csv).unwrap()).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "id,description,amount,currency,origin,status,created_date"
        );
        let data = lines.next().unwrap();
        assert!(data.contains("\"Fondo, \"\"obras\"\"\""));
        assert!(data.contains(",USD,aporte_extra,disponible,2025-03-01"));
    }

    #[test]
    fn test_json_is_an_array_of_objects() {
        let value: serde_json::Value = serde_json::from_slice(&render(&rows(), ExportFormat::Json).unwrap()).unwrap();
        let array = value.as_array().unwrap();
        assert_eq!(array.len(), 1);
        assert_eq!(array[0]["origin"], "aporte_extra");
        assert_eq!(array[0]["currency"], "USD");
    }

    #[test]
    fn test_export_file_name() {
        let now = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap().and_hms_opt(9, 5, 7).unwrap();
        assert_eq!(
            export_file_name(ExportType::Pagos, ExportFormat::Csv, now),
            "pagos_2025-06-01_090507.csv"
        );
        assert_eq!(
            export_file_name(ExportType::Reparaciones, ExportFormat::Json, now),
            "reparaciones_2025-06-01_090507.json"
        );
    }
}

// src/models/export.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::models::{
    common::Currency,
    fee::FeeStatus,
    lease::LeaseStatus,
    payment::{PaymentMethod, PaymentType},
    repair::{FundingSource, RepairStatus},
    reserve::{ReserveOrigin, ReserveStatus},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExportType {
    Pagos,
    Expensas,
    Contratos,
    Reservas,
    Reparaciones,
}

impl ExportType {
    pub fn as_str(self) -> &'static str {
        match self {
            ExportType::Pagos => "pagos",
            ExportType::Expensas => "expensas",
            ExportType::Contratos => "contratos",
            ExportType::Reservas => "reservas",
            ExportType::Reparaciones => "reparaciones",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Json => "application/json",
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ExportQuery {
    #[serde(rename = "type")]
    pub export_type: ExportType,
    #[serde(default)]
    pub format: ExportFormat,
    /// Aplicado a pagos, expensas e reparaciones
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

// Linhas planas (o writer de CSV não aceita structs aninhadas)

#[derive(Debug, Serialize, FromRow)]
pub struct PaymentExportRow {
    pub id: Uuid,
    pub payment_type: PaymentType,
    pub tenant: Option<String>,
    pub unit: Option<String>,
    pub amount: Decimal,
    pub currency: Currency,
    pub payment_date: NaiveDate,
    pub method: PaymentMethod,
    pub reference: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct FeeExportRow {
    pub id: Uuid,
    pub unit: String,
    pub year: i32,
    pub month: i32,
    pub total_amount: Decimal,
    pub due_date: NaiveDate,
    pub status: FeeStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct LeaseExportRow {
    pub id: Uuid,
    pub tenant: String,
    pub dni: String,
    pub unit: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub rent_amount: Decimal,
    pub currency: Currency,
    pub due_day: i32,
    pub deposit: Decimal,
    pub status: LeaseStatus,
}

#[derive(Debug, Serialize, FromRow)]
pub struct ReserveExportRow {
    pub id: Uuid,
    pub description: String,
    pub amount: Decimal,
    pub currency: Currency,
    pub origin: ReserveOrigin,
    pub status: ReserveStatus,
    pub created_date: NaiveDate,
}

#[derive(Debug, Serialize, FromRow)]
pub struct RepairExportRow {
    pub id: Uuid,
    pub unit: Option<String>,
    pub description: String,
    pub reported_date: NaiveDate,
    pub execution_date: Option<NaiveDate>,
    pub responsible: String,
    pub estimated_amount: Decimal,
    pub spent_amount: Decimal,
    pub currency: Currency,
    pub status: RepairStatus,
    pub funding_source: FundingSource,
}

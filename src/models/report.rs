// src/models/report.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::models::{
    common::Currency, fee::FeeStatus, payment::PaymentType, unit::UnitType,
};

// ---
// Conciliação
// ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReconciliationStatus {
    AlDia,
    Pendiente,
    Adelantado,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ReconciliationQuery {
    /// Padrão: mês atual
    pub month: Option<u32>,
    /// Padrão: ano atual
    pub year: Option<i32>,
    pub unit_id: Option<Uuid>,
}

// Dados brutos de uma unidade no período (saída do repositório)
#[derive(Debug, Clone, FromRow)]
pub struct ReconciliationSource {
    pub unit_id: Uuid,
    pub unit_number: String,
    pub unit_type: UnitType,
    pub lease_id: Option<Uuid>,
    pub tenant_name: Option<String>,
    pub currency: Option<Currency>,
    pub rent_due: Option<Decimal>,
    pub fee_id: Option<Uuid>,
    pub fee_due: Option<Decimal>,
    pub fee_status: Option<FeeStatus>,
    pub rent_paid: Decimal,
    pub fee_paid: Decimal,
    pub other_paid: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationRow {
    pub unit_id: Uuid,
    pub unit_number: String,
    pub unit_type: UnitType,
    pub lease_id: Option<Uuid>,
    pub tenant_name: Option<String>,
    pub currency: Option<Currency>,
    pub rent_due: Decimal,
    pub rent_paid: Decimal,
    pub rent_balance: Decimal,
    pub rent_surplus: Decimal,
    pub fee_id: Option<Uuid>,
    pub fee_status: Option<FeeStatus>,
    pub fee_due: Decimal,
    pub fee_paid: Decimal,
    pub fee_balance: Decimal,
    pub fee_surplus: Decimal,
    pub other_paid: Decimal,
    pub status: ReconciliationStatus,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationTotals {
    pub rent_due: Decimal,
    pub rent_paid: Decimal,
    pub rent_balance: Decimal,
    pub fee_due: Decimal,
    pub fee_paid: Decimal,
    pub fee_balance: Decimal,
    pub other_paid: Decimal,
    pub up_to_date: usize,
    pub pending: usize,
    pub ahead: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationReport {
    pub year: i32,
    pub month: u32,
    pub rows: Vec<ReconciliationRow>,
    pub totals: ReconciliationTotals,
}

// ---
// Dashboard
// ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_units: i64,
    pub occupied_units: i64,
    pub expiring_leases: i64,
    pub overdue_fees: i64,
    pub pending_repairs: i64,
    /// Soma dos pagamentos do mês corrente, por moeda
    pub month_income: Vec<CurrencyTotal>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyTotal {
    pub currency: Currency,
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IncomeExpense {
    pub year: i32,
    pub month: u32,
    pub currency: Currency,
    pub income: Decimal,
    pub expenses: Decimal,
    pub net: Decimal,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PeriodQuery {
    pub month: Option<u32>,
    pub year: Option<i32>,
    #[serde(default)]
    pub currency: Currency,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ChartQuery {
    pub year: Option<i32>,
    pub currency: Option<Currency>,
    pub unit_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyIncomeEntry {
    pub month: i32,
    pub payment_type: PaymentType,
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyFeeEntry {
    pub month: i32,
    pub total: Decimal,
    pub count: i64,
}

// src/models/repair.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::validation::{validate_not_blank, validate_not_negative, validate_positive},
    models::{common::Currency, payment::Payment, reserve::Reserve},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "repair_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RepairStatus {
    Pendiente,
    EnProceso,
    Finalizada,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "funding_source", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FundingSource {
    Reserva,
    FondoEdificio,
    Otro,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Repair {
    pub id: Uuid,
    /// Nulo para reparações do edifício
    pub unit_id: Option<Uuid>,
    #[schema(example = "Pérdida de agua en el baño")]
    pub description: String,
    pub reported_date: NaiveDate,
    pub execution_date: Option<NaiveDate>,
    #[schema(example = "Plomería Díaz")]
    pub responsible: String,
    pub estimated_amount: Decimal,
    pub spent_amount: Decimal,
    pub currency: Currency,
    pub status: RepairStatus,
    pub funding_source: FundingSource,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Repair {
    /// Só reparações pendentes e ainda sem financiamento podem consumir reservas.
    pub fn can_use_reserve(&self) -> bool {
        self.status == RepairStatus::Pendiente && self.funding_source == FundingSource::Otro
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RepairDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub repair: Repair,
    pub unit_number: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RepairPayload {
    pub unit_id: Option<Uuid>,

    #[validate(custom(function = "validate_not_blank"))]
    pub description: String,

    pub reported_date: NaiveDate,
    pub execution_date: Option<NaiveDate>,

    #[validate(custom(function = "validate_not_blank"))]
    pub responsible: String,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub estimated_amount: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub spent_amount: Decimal,

    #[serde(default)]
    pub currency: Currency,

    pub status: Option<RepairStatus>,
    pub funding_source: Option<FundingSource>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UseReservePayload {
    pub reserve_id: Uuid,

    #[validate(custom(function = "validate_positive"))]
    pub amount: Decimal,
}

// Resultado do consumo de uma reserva
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReserveUsage {
    pub repair: Repair,
    pub consumed_reserve: Reserve,
    /// Nova reserva com o saldo restante (consumo parcial)
    pub remainder: Option<Reserve>,
    pub payment: Payment,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct RepairFilter {
    /// Descrição ou responsável
    pub search: Option<String>,
    pub status: Option<RepairStatus>,
    pub funding_source: Option<FundingSource>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

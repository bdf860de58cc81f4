// src/models/reserve.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::validation::{validate_not_blank, validate_positive},
    models::common::Currency,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "reserve_origin", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReserveOrigin {
    ExcedenteExpensa,
    AporteExtra,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "reserve_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReserveStatus {
    Disponible,
    Usado,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Reserve {
    pub id: Uuid,
    #[schema(example = "Fondo de reserva 2025")]
    pub description: String,
    #[schema(example = "1000.00")]
    pub amount: Decimal,
    pub currency: Currency,
    pub origin: ReserveOrigin,
    pub status: ReserveStatus,
    pub created_date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReservePayload {
    #[validate(custom(function = "validate_not_blank"))]
    pub description: String,

    #[validate(custom(function = "validate_positive"))]
    pub amount: Decimal,

    #[serde(default)]
    pub currency: Currency,

    pub origin: Option<ReserveOrigin>,
    pub created_date: NaiveDate,
    pub notes: Option<String>,

    // Só usado na edição
    pub status: Option<ReserveStatus>,
}

// Saldo disponível por moeda
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReserveBalance {
    pub currency: Currency,
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReserveOriginSummary {
    pub origin: ReserveOrigin,
    pub count: i64,
    pub available: Decimal,
    pub used: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ReserveFilter {
    pub status: Option<ReserveStatus>,
    pub origin: Option<ReserveOrigin>,
    pub currency: Option<Currency>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AvailableReservesQuery {
    #[serde(default)]
    pub currency: Currency,
    /// Só reservas com saldo >= este valor
    pub min_amount: Option<Decimal>,
}

// src/models/lease.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::validation::{validate_not_negative, validate_positive},
    models::common::Currency,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "lease_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LeaseStatus {
    Activo,
    Finalizado,
    Renovado,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lease {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub unit_id: Uuid,
    #[schema(example = "2024-03-01")]
    pub start_date: NaiveDate,
    #[schema(example = "2026-02-28")]
    pub end_date: NaiveDate,
    #[schema(example = "350000.00")]
    pub rent_amount: Decimal,
    pub currency: Currency,
    #[schema(example = 10)]
    pub due_day: i32,
    pub deposit: Decimal,
    pub status: LeaseStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lease {
    /// Ativo = estado `activo` e ainda não vencido na data informada.
    pub fn is_active_on(&self, today: NaiveDate) -> bool {
        self.status == LeaseStatus::Activo && self.end_date >= today
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaseDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub lease: Lease,
    pub tenant_name: String,
    pub unit_number: String,
    pub building_name: String,
}

// Alerta de contratos próximos do vencimento
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpiringLease {
    pub id: Uuid,
    pub end_date: NaiveDate,
    pub tenant_name: String,
    pub unit_number: String,
    pub unit_type: crate::models::unit::UnitType,
    pub rent_amount: Decimal,
    pub currency: Currency,
    pub days_left: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_lease_dates"))]
pub struct LeasePayload {
    pub tenant_id: Uuid,
    pub unit_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    #[validate(custom(function = "validate_positive"))]
    pub rent_amount: Decimal,

    #[serde(default)]
    pub currency: Currency,

    #[validate(range(min = 1, max = 31, message = "validation.due_day"))]
    pub due_day: i32,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub deposit: Decimal,

    // Só usado na edição
    pub status: Option<LeaseStatus>,
}

fn validate_lease_dates(payload: &LeasePayload) -> Result<(), ValidationError> {
    if payload.end_date <= payload.start_date {
        let mut err = ValidationError::new("date_order");
        err.message = Some("validation.date_order".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenewLeasePayload {
    pub end_date: NaiveDate,

    #[validate(custom(function = "validate_positive"))]
    pub rent_amount: Decimal,

    #[serde(default)]
    pub currency: Currency,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct LeaseFilter {
    /// Nome do inquilino, DNI ou número da unidade
    pub search: Option<String>,
    pub status: Option<LeaseStatus>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExpiringQuery {
    /// Janela em dias (padrão 30)
    pub days: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn lease(status: LeaseStatus, end: NaiveDate) -> Lease {
        Lease {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            unit_id: Uuid::new_v4(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: end,
            rent_amount: dec!(1000),
            currency: Currency::Ars,
            due_day: 10,
            deposit: dec!(0),
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_active_lease_requires_status_and_future_end() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        assert!(lease(LeaseStatus::Activo, today).is_active_on(today));
        assert!(!lease(LeaseStatus::Activo, today.pred_opt().unwrap()).is_active_on(today));
        assert!(!lease(LeaseStatus::Renovado, today.succ_opt().unwrap()).is_active_on(today));
    }

    fn payload(start: NaiveDate, end: NaiveDate, rent: Decimal, due_day: i32) -> LeasePayload {
        LeasePayload {
            tenant_id: Uuid::new_v4(),
            unit_id: Uuid::new_v4(),
            start_date: start,
            end_date: end,
            rent_amount: rent,
            currency: Currency::Ars,
            due_day,
            deposit: dec!(0),
            status: None,
        }
    }

    #[test]
    fn test_payload_rejects_inverted_dates() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let errors = payload(start, end, dec!(1000), 10).validate().unwrap_err();
        assert!(errors.errors().contains_key("__all__"));
    }

    #[test]
    fn test_payload_rejects_zero_rent_and_bad_due_day() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let errors = payload(start, end, dec!(0), 32).validate().unwrap_err();
        assert_eq!(errors.field_errors().len(), 2);
        assert!(payload(start, end, dec!(1000), 31).validate().is_ok());
    }
}

// src/models/payment.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{common::validation::validate_positive, models::common::Currency};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    Alquiler,
    Expensa,
    Reserva,
    Reparacion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_method", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Efectivo,
    Transferencia,
    Cheque,
    Tarjeta,
    Otro,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub payment_type: PaymentType,
    pub tenant_id: Option<Uuid>,
    pub unit_id: Option<Uuid>,
    pub lease_id: Option<Uuid>,
    #[schema(example = "350000.00")]
    pub amount: Decimal,
    pub currency: Currency,
    pub payment_date: NaiveDate,
    pub method: PaymentMethod,
    pub reference: Option<String>,
    pub description: Option<String>,
    /// Nome do arquivo do comprovante
    pub receipt: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub payment: Payment,
    pub tenant_name: Option<String>,
    pub unit_number: Option<String>,
}

// Campos comuns a criação e edição
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPayload {
    pub payment_type: PaymentType,

    #[validate(required(message = "validation.required"))]
    pub tenant_id: Option<Uuid>,

    #[validate(required(message = "validation.required"))]
    pub unit_id: Option<Uuid>,

    pub lease_id: Option<Uuid>,

    #[validate(custom(function = "validate_positive"))]
    pub amount: Decimal,

    #[serde(default)]
    pub currency: Currency,

    pub payment_date: NaiveDate,
    pub method: PaymentMethod,
    pub reference: Option<String>,
    pub description: Option<String>,
}

impl PaymentPayload {
    /// Pagamento de aluguel precisa apontar para um contrato.
    pub fn validate_consistency(&self) -> Result<(), validator::ValidationErrors> {
        if self.payment_type == PaymentType::Alquiler && self.lease_id.is_none() {
            return Err(crate::common::validation::field_error(
                "leaseId",
                "required",
                "validation.lease_required",
            ));
        }
        Ok(())
    }
}

// Registro novo, já resolvido pelo service (pagamentos de reserva não têm inquilino)
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub payment_type: PaymentType,
    pub tenant_id: Option<Uuid>,
    pub unit_id: Option<Uuid>,
    pub lease_id: Option<Uuid>,
    pub amount: Decimal,
    pub currency: Currency,
    pub payment_date: NaiveDate,
    pub method: PaymentMethod,
    pub reference: Option<String>,
    pub description: Option<String>,
    pub created_by: Option<Uuid>,
}

impl NewPayment {
    pub fn from_payload(payload: &PaymentPayload, created_by: Option<Uuid>) -> Self {
        Self {
            payment_type: payload.payment_type,
            tenant_id: payload.tenant_id,
            unit_id: payload.unit_id,
            lease_id: payload.lease_id,
            amount: payload.amount,
            currency: payload.currency,
            payment_date: payload.payment_date,
            method: payload.method,
            reference: payload.reference.clone(),
            description: payload.description.clone(),
            created_by,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PaymentFilter {
    /// Nome do inquilino, número da unidade ou referência
    pub search: Option<String>,
    pub payment_type: Option<PaymentType>,
    pub method: Option<PaymentMethod>,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub currency: Option<Currency>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn payload(payment_type: PaymentType, lease_id: Option<Uuid>) -> PaymentPayload {
        PaymentPayload {
            payment_type,
            tenant_id: Some(Uuid::new_v4()),
            unit_id: Some(Uuid::new_v4()),
            lease_id,
            amount: dec!(1000),
            currency: Currency::Ars,
            payment_date: NaiveDate::from_ymd_opt(2025, 6, 5).unwrap(),
            method: PaymentMethod::Transferencia,
            reference: None,
            description: None,
        }
    }

    #[test]
    fn test_rent_payment_requires_lease() {
        assert!(payload(PaymentType::Alquiler, None).validate_consistency().is_err());
        assert!(payload(PaymentType::Alquiler, Some(Uuid::new_v4())).validate_consistency().is_ok());
        assert!(payload(PaymentType::Expensa, None).validate_consistency().is_ok());
    }

    #[test]
    fn test_tenant_and_unit_are_required() {
        let mut p = payload(PaymentType::Expensa, None);
        p.tenant_id = None;
        p.unit_id = None;
        assert_eq!(p.validate().unwrap_err().field_errors().len(), 2);
    }
}

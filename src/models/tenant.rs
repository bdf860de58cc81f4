// src/models/tenant.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::common::validation::{validate_dni, validate_not_blank, validate_phone};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: Uuid,
    #[schema(example = "Juan")]
    pub first_name: String,
    #[schema(example = "Pérez")]
    pub last_name: String,
    #[schema(example = "30123456")]
    pub dni: String,
    pub email: Option<String>,
    #[schema(example = "+5491145678901")]
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TenantPayload {
    #[validate(custom(function = "validate_not_blank"))]
    pub first_name: String,

    #[validate(custom(function = "validate_not_blank"))]
    pub last_name: String,

    #[validate(custom(function = "validate_dni"))]
    pub dni: String,

    #[validate(email(message = "validation.email"))]
    pub email: Option<String>,

    // Normalizado (só dígitos e '+') antes de gravar
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,

    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TenantFilter {
    /// Nome, sobrenome, DNI ou e-mail
    pub search: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

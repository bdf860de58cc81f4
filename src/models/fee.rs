// src/models/fee.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::validation::{validate_not_blank, validate_not_negative},
    models::unit::UnitType,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "fee_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FeeStatus {
    Pendiente,
    Pagada,
    Vencida,
}

impl FeeStatus {
    /// Estado inicial de uma expensa: já nasce vencida se o vencimento passou.
    pub fn initial(due_date: NaiveDate, today: NaiveDate) -> Self {
        if due_date < today {
            FeeStatus::Vencida
        } else {
            FeeStatus::Pendiente
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Fee {
    pub id: Uuid,
    pub unit_id: Uuid,
    #[schema(example = 2025)]
    pub year: i32,
    #[schema(example = 6)]
    pub month: i32,
    #[schema(example = "85000.00")]
    pub total_amount: Decimal,
    pub due_date: NaiveDate,
    pub status: FeeStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeeDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub fee: Fee,
    pub unit_number: String,
    pub unit_type: UnitType,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeeItem {
    pub id: Uuid,
    pub fee_id: Uuid,
    pub category_id: Option<Uuid>,
    #[schema(example = "Limpieza de escaleras")]
    pub description: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeeItemDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub item: FeeItem,
    pub category_name: Option<String>,
}

// Expensa com seus movimentos (usado pelo modal do front)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeeWithItems {
    #[serde(flatten)]
    pub fee: FeeDetail,
    pub items: Vec<FeeItemDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseCategory {
    pub id: Uuid,
    #[schema(example = "Limpieza")]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CategoryPayload {
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeeItemPayload {
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub amount: Decimal,
}

impl FeeItemPayload {
    // Linhas sem descrição ou com valor <= 0 são descartadas
    pub fn is_usable(&self) -> bool {
        !self.description.trim().is_empty() && self.amount > Decimal::ZERO
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeePayload {
    pub unit_id: Uuid,

    #[validate(range(min = 2000, max = 2100, message = "validation.year"))]
    pub year: i32,

    #[validate(range(min = 1, max = 12, message = "validation.month"))]
    pub month: i32,

    #[validate(custom(function = "validate_not_negative"))]
    pub total_amount: Decimal,

    pub due_date: NaiveDate,
    pub notes: Option<String>,

    #[serde(default)]
    pub items: Vec<FeeItemPayload>,

    // Só usado na edição
    pub status: Option<FeeStatus>,
}

impl FeePayload {
    pub fn usable_items(&self) -> impl Iterator<Item = &FeeItemPayload> {
        self.items.iter().filter(|item| item.is_usable())
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct FeeFilter {
    /// Número da unidade
    pub search: Option<String>,
    pub status: Option<FeeStatus>,
    pub month: Option<i32>,
    pub year: Option<i32>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_initial_status_depends_on_due_date() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        assert_eq!(FeeStatus::initial(today.pred_opt().unwrap(), today), FeeStatus::Vencida);
        assert_eq!(FeeStatus::initial(today, today), FeeStatus::Pendiente);
        assert_eq!(FeeStatus::initial(today.succ_opt().unwrap(), today), FeeStatus::Pendiente);
    }

    #[test]
    fn test_only_usable_items_are_kept() {
        let item = |description: &str, amount| FeeItemPayload {
            category_id: None,
            description: description.into(),
            amount,
        };
        let payload = FeePayload {
            unit_id: Uuid::new_v4(),
            year: 2025,
            month: 6,
            total_amount: dec!(1500),
            due_date: NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
            notes: None,
            items: vec![
                item("Limpieza", dec!(1000)),
                item("   ", dec!(200)),
                item("Luz", dec!(0)),
                item("Ascensor", dec!(500)),
            ],
            status: None,
        };
        let kept: Vec<_> = payload.usable_items().map(|i| i.description.as_str()).collect();
        assert_eq!(kept, vec!["Limpieza", "Ascensor"]);
    }
}

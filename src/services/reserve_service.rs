// src/services/reserve_service.rs

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{PageRequest, Paginated},
    },
    db::{reserve_repo::ReserveRecord, ReserveRepository},
    models::{
        common::Currency,
        reserve::{
            Reserve, ReserveBalance, ReserveFilter, ReserveOrigin, ReserveOriginSummary,
            ReservePayload, ReserveStatus,
        },
    },
};

/// Como uma reserva disponível é consumida.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumptionPlan {
    /// Consome tudo: a reserva passa a `usado`.
    Full { used: Decimal },
    /// A reserva fica com `used` (usado) e o saldo vira uma nova reserva disponível.
    Partial { used: Decimal, remainder: Decimal },
}

impl ConsumptionPlan {
    pub fn used(&self) -> Decimal {
        match *self {
            ConsumptionPlan::Full { used } | ConsumptionPlan::Partial { used, .. } => used,
        }
    }
}

pub fn plan_consumption(available: Decimal, amount: Decimal) -> Result<ConsumptionPlan, AppError> {
    if amount <= Decimal::ZERO {
        return Err(crate::common::validation::field_error("amount", "positive", "validation.positive").into());
    }
    if amount > available {
        return Err(AppError::ReserveInsufficient);
    }
    if amount == available {
        Ok(ConsumptionPlan::Full { used: amount })
    } else {
        Ok(ConsumptionPlan::Partial { used: amount, remainder: available - amount })
    }
}

#[derive(Clone)]
pub struct ReserveService {
    pool: PgPool,
    reserve_repo: ReserveRepository,
}

impl ReserveService {
    pub fn new(pool: PgPool, reserve_repo: ReserveRepository) -> Self {
        Self { pool, reserve_repo }
    }

    pub async fn list(&self, filter: &ReserveFilter) -> Result<Paginated<Reserve>, AppError> {
        let page = PageRequest::new(filter.page, filter.per_page);
        let (reserves, total) = self.reserve_repo.list(filter, page).await?;
        Ok(Paginated::new(reserves, total, page))
    }

    pub async fn get(&self, id: Uuid) -> Result<Reserve, AppError> {
        self.reserve_repo.find(id).await?.ok_or(AppError::NotFound("reserve"))
    }

    pub async fn create(&self, payload: &ReservePayload) -> Result<Reserve, AppError> {
        let record = ReserveRecord {
            description: payload.description.trim().to_string(),
            amount: payload.amount,
            currency: payload.currency,
            origin: payload.origin.unwrap_or(ReserveOrigin::AporteExtra),
            status: ReserveStatus::Disponible,
            created_date: payload.created_date,
            notes: payload.notes.clone(),
        };
        self.reserve_repo.create(&self.pool, &record).await
    }

    pub async fn update(&self, id: Uuid, payload: &ReservePayload) -> Result<Reserve, AppError> {
        self.reserve_repo
            .update(id, payload)
            .await?
            .ok_or(AppError::NotFound("reserve"))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.reserve_repo.delete(id).await? {
            return Err(AppError::NotFound("reserve"));
        }
        Ok(())
    }

    pub async fn balances(&self) -> Result<Vec<ReserveBalance>, AppError> {
        self.reserve_repo.balances().await
    }

    pub async fn summary_by_origin(&self) -> Result<Vec<ReserveOriginSummary>, AppError> {
        self.reserve_repo.summary_by_origin().await
    }

    pub async fn available(&self, currency: Currency, min_amount: Option<Decimal>) -> Result<Vec<Reserve>, AppError> {
        self.reserve_repo.available(currency, min_amount).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_partial_consumption_splits_the_reserve() {
        let plan = plan_consumption(dec!(1000), dec!(300)).unwrap();
        assert_eq!(plan, ConsumptionPlan::Partial { used: dec!(300), remainder: dec!(700) });
        assert_eq!(plan.used(), dec!(300));
    }

    #[test]
    fn test_full_consumption_leaves_no_remainder() {
        let plan = plan_consumption(dec!(1000), dec!(1000)).unwrap();
        assert_eq!(plan, ConsumptionPlan::Full { used: dec!(1000) });
    }

    #[test]
    fn test_cannot_consume_more_than_available() {
        assert!(matches!(
            plan_consumption(dec!(1000), dec!(1000.01)),
            Err(AppError::ReserveInsufficient)
        ));
    }

    #[test]
    fn test_amount_must_be_positive() {
        assert!(matches!(
            plan_consumption(dec!(1000), dec!(0)),
            Err(AppError::ValidationError(_))
        ));
    }
}

// src/services/repair_service.rs

use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{PageRequest, Paginated},
    },
    db::{
        reserve_repo::{ConsumedReserve, ReserveRecord},
        LeaseRepository, PaymentRepository, RepairRepository, ReserveRepository,
    },
    models::{
        payment::{NewPayment, PaymentMethod, PaymentType},
        repair::{Repair, RepairDetail, RepairFilter, RepairPayload, ReserveUsage, UseReservePayload},
        reserve::{Reserve, ReserveStatus},
    },
    services::reserve_service::{plan_consumption, ConsumptionPlan},
};

/// Divisão de `reserve` segundo o plano de consumo.
#[derive(Debug, Clone, PartialEq)]
pub struct ReserveSplit {
    pub consumed: ConsumedReserve,
    /// Nova reserva com o saldo, só no consumo parcial
    pub remainder: Option<ReserveRecord>,
}

pub fn split_reserve(reserve: &Reserve, repair_id: Uuid, plan: ConsumptionPlan, today: NaiveDate) -> ReserveSplit {
    let used = plan.used();
    let remainder = match plan {
        ConsumptionPlan::Full { .. } => None,
        // O saldo mantém a origem da reserva consumida
        ConsumptionPlan::Partial { remainder, .. } => Some(ReserveRecord {
            description: format!("Saldo de: {}", reserve.description),
            amount: remainder,
            currency: reserve.currency,
            origin: reserve.origin,
            status: ReserveStatus::Disponible,
            created_date: today,
            notes: Some(format!("Saldo restante tras usar {} en la reparación {}", used, repair_id)),
        }),
    };

    ReserveSplit {
        consumed: ConsumedReserve { amount: used, status: ReserveStatus::Usado },
        remainder,
    }
}

/// Pagamento do tipo reserva que registra o financiamento da reparação.
/// `tenant_id` é o inquilino do contrato vigente da unidade, se houver.
pub fn reserve_payment(
    repair: &Repair,
    reserve: &Reserve,
    used: Decimal,
    tenant_id: Option<Uuid>,
    today: NaiveDate,
    user_id: Uuid,
) -> NewPayment {
    NewPayment {
        payment_type: PaymentType::Reserva,
        tenant_id,
        unit_id: repair.unit_id,
        lease_id: None,
        amount: used,
        currency: reserve.currency,
        payment_date: today,
        method: PaymentMethod::Otro,
        reference: Some(format!("Reserva {}", reserve.id)),
        description: Some(format!("Uso de reserva para reparación: {}", repair.description)),
        created_by: Some(user_id),
    }
}

#[derive(Clone)]
pub struct RepairService {
    pool: PgPool,
    repair_repo: RepairRepository,
    reserve_repo: ReserveRepository,
    payment_repo: PaymentRepository,
    lease_repo: LeaseRepository,
}

impl RepairService {
    pub fn new(
        pool: PgPool,
        repair_repo: RepairRepository,
        reserve_repo: ReserveRepository,
        payment_repo: PaymentRepository,
        lease_repo: LeaseRepository,
    ) -> Self {
        Self { pool, repair_repo, reserve_repo, payment_repo, lease_repo }
    }

    pub async fn list(&self, filter: &RepairFilter) -> Result<Paginated<RepairDetail>, AppError> {
        let page = PageRequest::new(filter.page, filter.per_page);
        let (repairs, total) = self.repair_repo.list(filter, page).await?;
        Ok(Paginated::new(repairs, total, page))
    }

    pub async fn get(&self, id: Uuid) -> Result<RepairDetail, AppError> {
        self.repair_repo.find(id).await?.ok_or(AppError::NotFound("repair"))
    }

    pub async fn create(&self, payload: &RepairPayload) -> Result<Repair, AppError> {
        self.repair_repo.create(payload).await
    }

    pub async fn update(&self, id: Uuid, payload: &RepairPayload) -> Result<Repair, AppError> {
        self.repair_repo
            .update(id, payload)
            .await?
            .ok_or(AppError::NotFound("repair"))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repair_repo.delete(id).await? {
            return Err(AppError::NotFound("repair"));
        }
        Ok(())
    }

    /// Financia a reparação com uma reserva. Reparação e reserva ficam travadas
    /// até o commit; um consumo parcial gera uma nova reserva com o saldo.
    pub async fn use_reserve(
        &self,
        repair_id: Uuid,
        payload: &UseReservePayload,
        user_id: Uuid,
    ) -> Result<ReserveUsage, AppError> {
        let today = Local::now().date_naive();

        let mut tx = self.pool.begin().await?;

        let repair = self
            .repair_repo
            .find_for_update(&mut *tx, repair_id)
            .await?
            .ok_or(AppError::NotFound("repair"))?;
        if !repair.can_use_reserve() {
            return Err(AppError::RepairNotEligibleForReserve);
        }

        let reserve = self
            .reserve_repo
            .find_for_update(&mut *tx, payload.reserve_id)
            .await?
            .ok_or(AppError::NotFound("reserve"))?;
        if reserve.status != ReserveStatus::Disponible {
            return Err(AppError::ReserveNotAvailable);
        }

        let plan = plan_consumption(reserve.amount, payload.amount)?;
        let used = plan.used();
        let split = split_reserve(&reserve, repair.id, plan, today);

        let consumed_reserve = self.reserve_repo.mark_used(&mut *tx, reserve.id, &split.consumed).await?;
        let remainder = match &split.remainder {
            Some(record) => Some(self.reserve_repo.create(&mut *tx, record).await?),
            None => None,
        };

        let repair = self.repair_repo.mark_funded_by_reserve(&mut *tx, repair.id, used).await?;

        let active_lease = match repair.unit_id {
            Some(unit_id) => self.lease_repo.find_active_for_unit(&mut *tx, unit_id, today).await?,
            None => None,
        };
        let tenant_id = active_lease.as_ref().map(|l| l.tenant_id);
        let payment = self
            .payment_repo
            .create(&mut *tx, &reserve_payment(&repair, &reserve, used, tenant_id, today, user_id))
            .await?;

        tx.commit().await?;
        tracing::info!(
            "🔧 Reparação {} financiada com {} da reserva {}",
            repair.id,
            used,
            reserve.id
        );

        Ok(ReserveUsage { repair, consumed_reserve, remainder, payment })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        common::Currency,
        repair::{FundingSource, RepairStatus},
        reserve::ReserveOrigin,
    };
    use chrono::Utc;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn reserve(origin: ReserveOrigin) -> Reserve {
        Reserve {
            id: Uuid::new_v4(),
            description: "Fondo de reserva 2024".into(),
            amount: dec!(1000),
            currency: Currency::Usd,
            origin,
            status: ReserveStatus::Disponible,
            created_date: NaiveDate::from_ymd_opt(2024, 12, 1).unwrap(),
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn repair(unit_id: Option<Uuid>) -> Repair {
        Repair {
            id: Uuid::new_v4(),
            unit_id,
            description: "Cambio de bomba de agua".into(),
            reported_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            execution_date: None,
            responsible: "Plomería Díaz".into(),
            estimated_amount: dec!(300),
            spent_amount: dec!(0),
            currency: Currency::Usd,
            status: RepairStatus::Pendiente,
            funding_source: FundingSource::Otro,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[rstest]
    #[case(ReserveOrigin::ExcedenteExpensa)]
    #[case(ReserveOrigin::AporteExtra)]
    fn test_partial_split_keeps_origin_and_is_dated_today(#[case] origin: ReserveOrigin) {
        let reserve = reserve(origin);
        let plan = plan_consumption(reserve.amount, dec!(300)).unwrap();

        let split = split_reserve(&reserve, Uuid::new_v4(), plan, today());

        assert_eq!(split.consumed, ConsumedReserve { amount: dec!(300), status: ReserveStatus::Usado });
        let remainder = split.remainder.expect("consumo parcial gera saldo");
        assert_eq!(remainder.amount, dec!(700));
        assert_eq!(remainder.origin, origin);
        assert_eq!(remainder.currency, Currency::Usd);
        assert_eq!(remainder.status, ReserveStatus::Disponible);
        assert_eq!(remainder.created_date, today());
        assert_eq!(remainder.description, "Saldo de: Fondo de reserva 2024");
    }

    #[test]
    fn test_full_split_closes_the_whole_reserve() {
        let reserve = reserve(ReserveOrigin::AporteExtra);
        let plan = plan_consumption(reserve.amount, dec!(1000)).unwrap();

        let split = split_reserve(&reserve, Uuid::new_v4(), plan, today());

        assert_eq!(split.consumed, ConsumedReserve { amount: dec!(1000), status: ReserveStatus::Usado });
        assert!(split.remainder.is_none());
    }

    #[rstest]
    #[case(Some(Uuid::new_v4()))]
    #[case(None)]
    fn test_reserve_payment_goes_to_active_tenant_or_nobody(#[case] tenant_id: Option<Uuid>) {
        let repair = repair(Some(Uuid::new_v4()));
        let reserve = reserve(ReserveOrigin::ExcedenteExpensa);
        let user_id = Uuid::new_v4();

        let payment = reserve_payment(&repair, &reserve, dec!(300), tenant_id, today(), user_id);

        assert_eq!(payment.tenant_id, tenant_id);
        assert_eq!(payment.unit_id, repair.unit_id);
        assert_eq!(payment.payment_type, PaymentType::Reserva);
        assert_eq!(payment.method, PaymentMethod::Otro);
        assert_eq!(payment.amount, dec!(300));
        assert_eq!(payment.currency, Currency::Usd);
        assert_eq!(payment.payment_date, today());
        assert_eq!(payment.lease_id, None);
        assert_eq!(payment.created_by, Some(user_id));
    }
}

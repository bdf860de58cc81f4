// src/services/lease_service.rs

use chrono::{Local, NaiveDate};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{PageRequest, Paginated},
        validation::field_error,
    },
    db::{lease_repo::LeaseRecord, LeaseRepository, UnitRepository},
    models::lease::{
        ExpiringLease, Lease, LeaseDetail, LeaseFilter, LeasePayload, LeaseStatus, RenewLeasePayload,
    },
};

pub const DEFAULT_EXPIRING_DAYS: i32 = 30;

fn record_from(payload: &LeasePayload, status: LeaseStatus) -> LeaseRecord {
    LeaseRecord {
        tenant_id: payload.tenant_id,
        unit_id: payload.unit_id,
        start_date: payload.start_date,
        end_date: payload.end_date,
        rent_amount: payload.rent_amount,
        currency: payload.currency,
        due_day: payload.due_day,
        deposit: payload.deposit,
        status,
    }
}

/// Contrato que substitui `current` a partir de `today`.
pub fn renewal_record(current: &Lease, payload: &RenewLeasePayload, today: NaiveDate) -> Result<LeaseRecord, AppError> {
    if payload.end_date <= today {
        return Err(field_error("endDate", "date_order", "validation.date_order").into());
    }
    Ok(LeaseRecord {
        tenant_id: current.tenant_id,
        unit_id: current.unit_id,
        start_date: today,
        end_date: payload.end_date,
        rent_amount: payload.rent_amount,
        currency: payload.currency,
        due_day: current.due_day,
        deposit: current.deposit,
        status: LeaseStatus::Activo,
    })
}

#[derive(Clone)]
pub struct LeaseService {
    pool: PgPool,
    lease_repo: LeaseRepository,
    unit_repo: UnitRepository,
}

impl LeaseService {
    pub fn new(pool: PgPool, lease_repo: LeaseRepository, unit_repo: UnitRepository) -> Self {
        Self { pool, lease_repo, unit_repo }
    }

    pub async fn list(&self, filter: &LeaseFilter) -> Result<Paginated<LeaseDetail>, AppError> {
        let page = PageRequest::new(filter.page, filter.per_page);
        let (leases, total) = self.lease_repo.list(filter, page).await?;
        Ok(Paginated::new(leases, total, page))
    }

    pub async fn get(&self, id: Uuid) -> Result<LeaseDetail, AppError> {
        self.lease_repo.find(id).await?.ok_or(AppError::NotFound("lease"))
    }

    pub async fn expiring(&self, days: Option<i32>) -> Result<Vec<ExpiringLease>, AppError> {
        let days = days.unwrap_or(DEFAULT_EXPIRING_DAYS).clamp(1, 365);
        self.lease_repo.expiring_within(days).await
    }

    pub async fn create(&self, payload: &LeasePayload) -> Result<Lease, AppError> {
        let today = Local::now().date_naive();
        let record = record_from(payload, payload.status.unwrap_or(LeaseStatus::Activo));

        let mut tx = self.pool.begin().await?;

        // A trava na unidade serializa criações concorrentes para a mesma unidade
        if !self.unit_repo.lock_unit(&mut *tx, record.unit_id).await? {
            return Err(AppError::NotFound("unit"));
        }
        if Self::is_active(&record, today)
            && self.lease_repo.has_active_lease(&mut *tx, record.unit_id, None, today).await?
        {
            return Err(AppError::UnitHasActiveLease);
        }

        let lease = self.lease_repo.create(&mut *tx, &record).await?;
        tx.commit().await?;

        Ok(lease)
    }

    pub async fn update(&self, id: Uuid, payload: &LeasePayload) -> Result<Lease, AppError> {
        let today = Local::now().date_naive();

        let mut tx = self.pool.begin().await?;

        let current = self
            .lease_repo
            .find_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("lease"))?;
        let record = record_from(payload, payload.status.unwrap_or(current.status));

        if !self.unit_repo.lock_unit(&mut *tx, record.unit_id).await? {
            return Err(AppError::NotFound("unit"));
        }
        if Self::is_active(&record, today)
            && self.lease_repo.has_active_lease(&mut *tx, record.unit_id, Some(id), today).await?
        {
            return Err(AppError::UnitHasActiveLease);
        }

        let lease = self
            .lease_repo
            .update(&mut *tx, id, &record)
            .await?
            .ok_or(AppError::NotFound("lease"))?;
        tx.commit().await?;

        Ok(lease)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.lease_repo.delete(id).await? {
            return Err(AppError::NotFound("lease"));
        }
        Ok(())
    }

    /// Marca o contrato atual como renovado e cria o novo, na mesma transação.
    pub async fn renew(&self, id: Uuid, payload: &RenewLeasePayload) -> Result<Lease, AppError> {
        let today = Local::now().date_naive();

        let mut tx = self.pool.begin().await?;

        let current = self
            .lease_repo
            .find_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("lease"))?;
        if current.status != LeaseStatus::Activo {
            return Err(AppError::LeaseNotActive);
        }
        let record = renewal_record(&current, payload, today)?;

        self.lease_repo.set_status(&mut *tx, current.id, LeaseStatus::Renovado).await?;
        let renewed = self.lease_repo.create(&mut *tx, &record).await?;

        tx.commit().await?;
        tracing::info!("📄 Contrato {} renovado como {}", current.id, renewed.id);

        Ok(renewed)
    }

    // Mesmo critério de `has_active_lease`, que recebe o mesmo `today`
    fn is_active(record: &LeaseRecord, today: NaiveDate) -> bool {
        record.status == LeaseStatus::Activo && record.end_date >= today
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::common::Currency;
    use chrono::Utc;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn lease() -> Lease {
        Lease {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            unit_id: Uuid::new_v4(),
            start_date: NaiveDate::from_ymd_opt(2023, 7, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
            rent_amount: dec!(250000),
            currency: Currency::Ars,
            due_day: 5,
            deposit: dec!(500000),
            status: LeaseStatus::Activo,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_renewal_starts_today_and_copies_terms() {
        let current = lease();
        let today = NaiveDate::from_ymd_opt(2025, 6, 20).unwrap();
        let payload = RenewLeasePayload {
            end_date: NaiveDate::from_ymd_opt(2027, 6, 30).unwrap(),
            rent_amount: dec!(400),
            currency: Currency::Usd,
        };

        let record = renewal_record(&current, &payload, today).unwrap();

        assert_eq!(record.start_date, today);
        assert_eq!(record.end_date, payload.end_date);
        assert_eq!(record.rent_amount, dec!(400));
        assert_eq!(record.currency, Currency::Usd);
        assert_eq!(record.due_day, 5);
        assert_eq!(record.deposit, dec!(500000));
        assert_eq!(record.unit_id, current.unit_id);
        assert_eq!(record.status, LeaseStatus::Activo);
    }

    #[test]
    fn test_renewal_rejects_end_date_not_after_today() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 20).unwrap();
        let payload = RenewLeasePayload { end_date: today, rent_amount: dec!(1), currency: Currency::Ars };
        assert!(matches!(
            renewal_record(&lease(), &payload, today),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_only_current_active_leases_block_the_unit() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 20).unwrap();
        let mut record = renewal_record(
            &lease(),
            &RenewLeasePayload {
                end_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
                rent_amount: dec!(1),
                currency: Currency::Ars,
            },
            today,
        )
        .unwrap();
        assert!(LeaseService::is_active(&record, today));

        record.status = LeaseStatus::Finalizado;
        assert!(!LeaseService::is_active(&record, today));
    }

    #[rstest]
    #[case(NaiveDate::from_ymd_opt(2025, 6, 20).unwrap(), true)]
    #[case(NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(), true)]
    #[case(NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(), false)]
    fn test_lease_is_active_through_its_end_date(#[case] today: NaiveDate, #[case] active: bool) {
        let record = renewal_record(
            &lease(),
            &RenewLeasePayload {
                end_date: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
                rent_amount: dec!(1),
                currency: Currency::Ars,
            },
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        )
        .unwrap();

        assert_eq!(LeaseService::is_active(&record, today), active);
    }
}

// src/services/report_service.rs

use chrono::{Datelike, Duration, Local, NaiveDate};
use rust_decimal::Decimal;

use crate::{
    common::{db_utils::period_bounds, error::AppError, validation::field_error},
    db::{LeaseRepository, ReportRepository},
    models::{
        lease::ExpiringLease,
        report::{
            ChartQuery, DashboardSummary, IncomeExpense, MonthlyFeeEntry, MonthlyIncomeEntry,
            PeriodQuery, ReconciliationQuery, ReconciliationReport, ReconciliationRow,
            ReconciliationSource, ReconciliationStatus, ReconciliationTotals,
        },
    },
    services::lease_service::DEFAULT_EXPIRING_DAYS,
};

// ---
// Conciliação (cálculo puro)
// ---

fn clamp_zero(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}

/// Devido x pago de uma unidade no período.
pub fn reconcile(source: ReconciliationSource) -> ReconciliationRow {
    let rent_due = source.rent_due.unwrap_or(Decimal::ZERO);
    let fee_due = source.fee_due.unwrap_or(Decimal::ZERO);

    let rent_balance = clamp_zero(rent_due - source.rent_paid);
    let rent_surplus = clamp_zero(source.rent_paid - rent_due);
    let fee_balance = clamp_zero(fee_due - source.fee_paid);
    let fee_surplus = clamp_zero(source.fee_paid - fee_due);

    let status = if rent_balance > Decimal::ZERO || fee_balance > Decimal::ZERO {
        ReconciliationStatus::Pendiente
    } else if rent_surplus > Decimal::ZERO || fee_surplus > Decimal::ZERO {
        ReconciliationStatus::Adelantado
    } else {
        ReconciliationStatus::AlDia
    };

    ReconciliationRow {
        unit_id: source.unit_id,
        unit_number: source.unit_number,
        unit_type: source.unit_type,
        lease_id: source.lease_id,
        tenant_name: source.tenant_name,
        currency: source.currency,
        rent_due,
        rent_paid: source.rent_paid,
        rent_balance,
        rent_surplus,
        fee_id: source.fee_id,
        fee_status: source.fee_status,
        fee_due,
        fee_paid: source.fee_paid,
        fee_balance,
        fee_surplus,
        other_paid: source.other_paid,
        status,
    }
}

pub fn build_report(year: i32, month: u32, sources: Vec<ReconciliationSource>) -> ReconciliationReport {
    let rows: Vec<ReconciliationRow> = sources.into_iter().map(reconcile).collect();

    let totals = rows.iter().fold(ReconciliationTotals::default(), |mut acc, row| {
        acc.rent_due += row.rent_due;
        acc.rent_paid += row.rent_paid;
        acc.rent_balance += row.rent_balance;
        acc.fee_due += row.fee_due;
        acc.fee_paid += row.fee_paid;
        acc.fee_balance += row.fee_balance;
        acc.other_paid += row.other_paid;
        match row.status {
            ReconciliationStatus::AlDia => acc.up_to_date += 1,
            ReconciliationStatus::Pendiente => acc.pending += 1,
            ReconciliationStatus::Adelantado => acc.ahead += 1,
        }
        acc
    });

    ReconciliationReport { year, month, rows, totals }
}

/// Período pedido (padrão: mês corrente) e seus limites.
fn resolve_period(
    year: Option<i32>,
    month: Option<u32>,
    today: NaiveDate,
) -> Result<(i32, u32, NaiveDate, NaiveDate), AppError> {
    let year = year.unwrap_or(today.year());
    let month = month.unwrap_or(today.month());
    let (from, to) = period_bounds(year, month)
        .ok_or_else(|| AppError::from(field_error("month", "range", "validation.month")))?;
    Ok((year, month, from, to))
}

#[derive(Clone)]
pub struct ReportService {
    report_repo: ReportRepository,
    lease_repo: LeaseRepository,
}

impl ReportService {
    pub fn new(report_repo: ReportRepository, lease_repo: LeaseRepository) -> Self {
        Self { report_repo, lease_repo }
    }

    pub async fn reconciliation(&self, query: &ReconciliationQuery) -> Result<ReconciliationReport, AppError> {
        let today = Local::now().date_naive();
        let (year, month, from, to) = resolve_period(query.year, query.month, today)?;

        let sources = self
            .report_repo
            .reconciliation_sources(from, to, year, month, today, query.unit_id)
            .await?;

        Ok(build_report(year, month, sources))
    }

    pub async fn dashboard(&self) -> Result<DashboardSummary, AppError> {
        let today = Local::now().date_naive();
        let (_, _, from, to) = resolve_period(None, None, today)?;

        let counts = self
            .report_repo
            .dashboard_counts(today, today + Duration::days(i64::from(DEFAULT_EXPIRING_DAYS)))
            .await?;
        let month_income = self.report_repo.income_by_currency(from, to).await?;

        Ok(DashboardSummary {
            total_units: counts.total_units,
            occupied_units: counts.occupied_units,
            expiring_leases: counts.expiring_leases,
            overdue_fees: counts.overdue_fees,
            pending_repairs: counts.pending_repairs,
            month_income,
        })
    }

    pub async fn expiring_alerts(&self) -> Result<Vec<ExpiringLease>, AppError> {
        self.lease_repo.expiring_within(DEFAULT_EXPIRING_DAYS).await
    }

    pub async fn income_expense(&self, query: &PeriodQuery) -> Result<IncomeExpense, AppError> {
        let today = Local::now().date_naive();
        let (year, month, from, to) = resolve_period(query.year, query.month, today)?;

        let (income, expenses) = self
            .report_repo
            .income_and_expenses(from, to, query.currency)
            .await?;

        Ok(IncomeExpense {
            year,
            month,
            currency: query.currency,
            income,
            expenses,
            net: income - expenses,
        })
    }

    pub async fn monthly_income(&self, query: &ChartQuery) -> Result<Vec<MonthlyIncomeEntry>, AppError> {
        let year = query.year.unwrap_or(Local::now().year());
        self.report_repo.monthly_income(year, query.currency, query.unit_id).await
    }

    pub async fn monthly_fees(&self, query: &ChartQuery) -> Result<Vec<MonthlyFeeEntry>, AppError> {
        let year = query.year.unwrap_or(Local::now().year());
        self.report_repo.monthly_fees(year, query.unit_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{common::Currency, unit::UnitType};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn source(rent_due: Option<Decimal>, rent_paid: Decimal, fee_due: Option<Decimal>, fee_paid: Decimal) -> ReconciliationSource {
        ReconciliationSource {
            unit_id: Uuid::new_v4(),
            unit_number: "2A".into(),
            unit_type: UnitType::Departamento,
            lease_id: rent_due.map(|_| Uuid::new_v4()),
            tenant_name: rent_due.map(|_| "Juan Pérez".into()),
            currency: rent_due.map(|_| Currency::Ars),
            rent_due,
            fee_id: fee_due.map(|_| Uuid::new_v4()),
            fee_due,
            fee_status: None,
            rent_paid,
            fee_paid,
            other_paid: Decimal::ZERO,
        }
    }

    #[test]
    fn test_partial_rent_payment_is_pending() {
        let row = reconcile(source(Some(dec!(1000)), dec!(400), None, dec!(0)));
        assert_eq!(row.rent_balance, dec!(600));
        assert_eq!(row.status, ReconciliationStatus::Pendiente);
    }

    #[test]
    fn test_fully_paid_rent_and_fee_is_up_to_date() {
        let row = reconcile(source(Some(dec!(1000)), dec!(1000), Some(dec!(500)), dec!(500)));
        assert_eq!(row.rent_balance, dec!(0));
        assert_eq!(row.fee_balance, dec!(0));
        assert_eq!(row.status, ReconciliationStatus::AlDia);
    }

    #[test]
    fn test_overpayment_is_reported_as_ahead() {
        let row = reconcile(source(Some(dec!(1000)), dec!(1200), Some(dec!(500)), dec!(500)));
        assert_eq!(row.rent_balance, dec!(0));
        assert_eq!(row.rent_surplus, dec!(200));
        assert_eq!(row.status, ReconciliationStatus::Adelantado);
    }

    #[test]
    fn test_pending_wins_over_surplus() {
        let row = reconcile(source(Some(dec!(1000)), dec!(1200), Some(dec!(500)), dec!(100)));
        assert_eq!(row.fee_balance, dec!(400));
        assert_eq!(row.status, ReconciliationStatus::Pendiente);
    }

    #[test]
    fn test_unit_without_lease_or_fee_has_no_obligation() {
        let row = reconcile(source(None, dec!(0), None, dec!(0)));
        assert_eq!(row.rent_due, dec!(0));
        assert_eq!(row.fee_due, dec!(0));
        assert!(row.lease_id.is_none());
        assert_eq!(row.status, ReconciliationStatus::AlDia);
    }

    #[test]
    fn test_report_totals_and_status_counts() {
        let report = build_report(
            2025,
            6,
            vec![
                source(Some(dec!(1000)), dec!(400), Some(dec!(500)), dec!(500)),
                source(Some(dec!(800)), dec!(800), None, dec!(0)),
                source(Some(dec!(700)), dec!(900), None, dec!(0)),
            ],
        );

        assert_eq!(report.rows.len(), 3);
        assert_eq!(report.totals.rent_due, dec!(2500));
        assert_eq!(report.totals.rent_paid, dec!(2100));
        assert_eq!(report.totals.rent_balance, dec!(600));
        assert_eq!(report.totals.fee_due, dec!(500));
        assert_eq!(report.totals.pending, 1);
        assert_eq!(report.totals.up_to_date, 1);
        assert_eq!(report.totals.ahead, 1);
    }

    #[test]
    fn test_resolve_period_defaults_and_validation() {
        let today = NaiveDate::from_ymd_opt(2025, 2, 14).unwrap();
        let (year, month, from, to) = resolve_period(None, None, today).unwrap();
        assert_eq!((year, month), (2025, 2));
        assert_eq!(from, NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
        assert_eq!(to, NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());

        assert!(matches!(resolve_period(Some(2025), Some(13), today), Err(AppError::ValidationError(_))));
    }
}

// src/db/report_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        common::Currency,
        report::{CurrencyTotal, MonthlyFeeEntry, MonthlyIncomeEntry, ReconciliationSource},
    },
};

// Contadores do painel
#[derive(Debug, sqlx::FromRow)]
pub struct DashboardCounts {
    pub total_units: i64,
    pub occupied_units: i64,
    pub expiring_leases: i64,
    pub overdue_fees: i64,
    pub pending_repairs: i64,
}

#[derive(Clone)]
pub struct ReportRepository {
    pool: PgPool,
}

impl ReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Uma linha por unidade ativa: contrato vigente em `today`, expensa do período
    /// e pagamentos do período separados por tipo.
    pub async fn reconciliation_sources(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        year: i32,
        month: u32,
        today: NaiveDate,
        unit_id: Option<Uuid>,
    ) -> Result<Vec<ReconciliationSource>, AppError> {
        let rows = sqlx::query_as::<_, ReconciliationSource>(
            r#"
            SELECT u.id AS unit_id,
                   u.number AS unit_number,
                   u.unit_type,
                   l.id AS lease_id,
                   t.first_name || ' ' || t.last_name AS tenant_name,
                   l.currency,
                   l.rent_amount AS rent_due,
                   f.id AS fee_id,
                   f.total_amount AS fee_due,
                   f.status AS fee_status,
                   p.rent_paid,
                   p.fee_paid,
                   p.other_paid
            FROM units u
            LEFT JOIN LATERAL (
                SELECT * FROM leases
                WHERE unit_id = u.id AND status = 'activo' AND end_date >= $5
                ORDER BY start_date DESC
                LIMIT 1
            ) l ON TRUE
            LEFT JOIN tenants t ON t.id = l.tenant_id
            LEFT JOIN fees f ON f.unit_id = u.id AND f.year = $3 AND f.month = $4
            CROSS JOIN LATERAL (
                SELECT COALESCE(SUM(amount) FILTER (WHERE payment_type = 'alquiler'), 0) AS rent_paid,
                       COALESCE(SUM(amount) FILTER (WHERE payment_type = 'expensa'), 0) AS fee_paid,
                       COALESCE(SUM(amount) FILTER (WHERE payment_type NOT IN ('alquiler', 'expensa')), 0) AS other_paid
                FROM payments
                WHERE unit_id = u.id AND payment_date BETWEEN $1 AND $2
            ) p
            WHERE u.active AND ($6::UUID IS NULL OR u.id = $6)
            ORDER BY u.number
            "#,
        )
        .bind(from)
        .bind(to)
        .bind(year)
        .bind(month as i32)
        .bind(today)
        .bind(unit_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn dashboard_counts(&self, today: NaiveDate, expiring_until: NaiveDate) -> Result<DashboardCounts, AppError> {
        let counts = sqlx::query_as::<_, DashboardCounts>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM units WHERE active) AS total_units,
                (SELECT COUNT(DISTINCT unit_id) FROM leases
                  WHERE status = 'activo' AND end_date >= $1) AS occupied_units,
                (SELECT COUNT(*) FROM leases
                  WHERE status = 'activo' AND end_date BETWEEN $1 AND $2) AS expiring_leases,
                (SELECT COUNT(*) FROM fees WHERE status = 'vencida') AS overdue_fees,
                (SELECT COUNT(*) FROM repairs WHERE status <> 'finalizada') AS pending_repairs
            "#,
        )
        .bind(today)
        .bind(expiring_until)
        .fetch_one(&self.pool)
        .await?;
        Ok(counts)
    }

    pub async fn income_by_currency(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<CurrencyTotal>, AppError> {
        let totals = sqlx::query_as::<_, CurrencyTotal>(
            r#"
            SELECT currency, SUM(amount) AS total
            FROM payments
            WHERE payment_date BETWEEN $1 AND $2
            GROUP BY currency
            ORDER BY currency
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(totals)
    }

    /// Receitas (aluguel + expensas) e despesas (reparações finalizadas que não
    /// saíram da reserva) do período numa moeda.
    pub async fn income_and_expenses(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        currency: Currency,
    ) -> Result<(Decimal, Decimal), AppError> {
        let totals = sqlx::query_as::<_, (Decimal, Decimal)>(
            r#"
            SELECT
                (SELECT COALESCE(SUM(amount), 0) FROM payments
                  WHERE currency = $3 AND payment_type IN ('alquiler', 'expensa')
                    AND payment_date BETWEEN $1 AND $2),
                (SELECT COALESCE(SUM(spent_amount), 0) FROM repairs
                  WHERE currency = $3 AND status = 'finalizada' AND funding_source <> 'reserva'
                    AND execution_date BETWEEN $1 AND $2)
            "#,
        )
        .bind(from)
        .bind(to)
        .bind(currency)
        .fetch_one(&self.pool)
        .await?;
        Ok(totals)
    }

    pub async fn monthly_income(
        &self,
        year: i32,
        currency: Option<Currency>,
        unit_id: Option<Uuid>,
    ) -> Result<Vec<MonthlyIncomeEntry>, AppError> {
        let entries = sqlx::query_as::<_, MonthlyIncomeEntry>(
            r#"
            SELECT EXTRACT(MONTH FROM payment_date)::INT AS month, payment_type, SUM(amount) AS total
            FROM payments
            WHERE EXTRACT(YEAR FROM payment_date)::INT = $1
              AND ($2::currency IS NULL OR currency = $2)
              AND ($3::UUID IS NULL OR unit_id = $3)
            GROUP BY 1, 2
            ORDER BY 1, 2
            "#,
        )
        .bind(year)
        .bind(currency)
        .bind(unit_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    pub async fn monthly_fees(&self, year: i32, unit_id: Option<Uuid>) -> Result<Vec<MonthlyFeeEntry>, AppError> {
        let entries = sqlx::query_as::<_, MonthlyFeeEntry>(
            r#"
            SELECT month, SUM(total_amount) AS total, COUNT(*) AS count
            FROM fees
            WHERE year = $1 AND ($2::UUID IS NULL OR unit_id = $2)
            GROUP BY month
            ORDER BY month
            "#,
        )
        .bind(year)
        .bind(unit_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }
}

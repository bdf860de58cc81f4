// src/db/export_repo.rs

use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::export::{
        ExportFormat, ExportType, FeeExportRow, LeaseExportRow, PaymentExportRow, RepairExportRow,
        ReserveExportRow,
    },
};

fn push_date_range(
    qb: &mut QueryBuilder<'_, Postgres>,
    column: &str,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) {
    if let Some(from) = from {
        qb.push(format!(" AND {} >= ", column)).push_bind(from);
    }
    if let Some(to) = to {
        qb.push(format!(" AND {} <= ", column)).push_bind(to);
    }
}

#[derive(Clone)]
pub struct ExportRepository {
    pool: PgPool,
}

impl ExportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn payments(&self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<Vec<PaymentExportRow>, AppError> {
        let mut qb = QueryBuilder::new(
            r#"
            SELECT p.id, p.payment_type,
                   t.first_name || ' ' || t.last_name AS tenant,
                   u.number AS unit,
                   p.amount, p.currency, p.payment_date, p.method, p.reference, p.description
            FROM payments p
            LEFT JOIN tenants t ON t.id = p.tenant_id
            LEFT JOIN units u ON u.id = p.unit_id
            WHERE 1=1
            "#,
        );
        push_date_range(&mut qb, "p.payment_date", from, to);
        qb.push(" ORDER BY p.payment_date, p.created_at");
        Ok(qb.build_query_as().fetch_all(&self.pool).await?)
    }

    // Expensas filtradas pela data de vencimento
    pub async fn fees(&self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<Vec<FeeExportRow>, AppError> {
        let mut qb = QueryBuilder::new(
            r#"
            SELECT f.id, u.number AS unit, f.year, f.month, f.total_amount, f.due_date, f.status, f.notes
            FROM fees f
            JOIN units u ON u.id = f.unit_id
            WHERE 1=1
            "#,
        );
        push_date_range(&mut qb, "f.due_date", from, to);
        qb.push(" ORDER BY f.year, f.month, u.number");
        Ok(qb.build_query_as().fetch_all(&self.pool).await?)
    }

    pub async fn leases(&self) -> Result<Vec<LeaseExportRow>, AppError> {
        let rows = sqlx::query_as::<_, LeaseExportRow>(
            r#"
            SELECT l.id, t.first_name || ' ' || t.last_name AS tenant, t.dni, u.number AS unit,
                   l.start_date, l.end_date, l.rent_amount, l.currency, l.due_day, l.deposit, l.status
            FROM leases l
            JOIN tenants t ON t.id = l.tenant_id
            JOIN units u ON u.id = l.unit_id
            ORDER BY l.start_date
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn reserves(&self) -> Result<Vec<ReserveExportRow>, AppError> {
        let rows = sqlx::query_as::<_, ReserveExportRow>(
            r#"
            SELECT id, description, amount, currency, origin, status, created_date
            FROM reserves
            ORDER BY created_date, created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn repairs(&self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<Vec<RepairExportRow>, AppError> {
        let mut qb = QueryBuilder::new(
            r#"
            SELECT r.id, u.number AS unit, r.description, r.reported_date, r.execution_date,
                   r.responsible, r.estimated_amount, r.spent_amount, r.currency, r.status, r.funding_source
            FROM repairs r
            LEFT JOIN units u ON u.id = r.unit_id
            WHERE 1=1
            "#,
        );
        push_date_range(&mut qb, "r.reported_date", from, to);
        qb.push(" ORDER BY r.reported_date, r.created_at");
        Ok(qb.build_query_as().fetch_all(&self.pool).await?)
    }

    pub async fn record_export(
        &self,
        user_id: Uuid,
        export_type: ExportType,
        format: ExportFormat,
        row_count: usize,
    ) -> Result<(), AppError> {
        sqlx::query("INSERT INTO exports (user_id, export_type, format, row_count) VALUES ($1, $2, $3, $4)")
            .bind(user_id)
            .bind(export_type.as_str())
            .bind(format.extension())
            .bind(i32::try_from(row_count).unwrap_or(i32::MAX))
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

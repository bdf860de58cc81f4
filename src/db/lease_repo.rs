// src/db/lease_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{like_pattern, map_delete_error, map_write_error},
        error::AppError,
        pagination::PageRequest,
    },
    models::{
        common::Currency,
        lease::{ExpiringLease, Lease, LeaseDetail, LeaseFilter, LeaseStatus},
    },
};

const LEASE_DETAIL_SELECT: &str = r#"
    SELECT l.*,
           t.first_name || ' ' || t.last_name AS tenant_name,
           u.number AS unit_number,
           b.name AS building_name
    FROM leases l
    JOIN tenants t ON t.id = l.tenant_id
    JOIN units u ON u.id = l.unit_id
    JOIN buildings b ON b.id = u.building_id
"#;

// Valores de um contrato novo ou editado
pub struct LeaseRecord {
    pub tenant_id: Uuid,
    pub unit_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub rent_amount: Decimal,
    pub currency: Currency,
    pub due_day: i32,
    pub deposit: Decimal,
    pub status: LeaseStatus,
}

#[derive(Clone)]
pub struct LeaseRepository {
    pool: PgPool,
}

impl LeaseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: &LeaseFilter, page: PageRequest) -> Result<(Vec<LeaseDetail>, i64), AppError> {
        fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &LeaseFilter) {
            if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
                let pattern = like_pattern(search);
                qb.push(" AND (t.first_name ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR t.last_name ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR t.dni ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR u.number ILIKE ")
                    .push_bind(pattern)
                    .push(")");
            }
            if let Some(status) = filter.status {
                qb.push(" AND l.status = ").push_bind(status);
            }
        }

        let mut count_qb = QueryBuilder::new(
            r#"
            SELECT COUNT(*) FROM leases l
            JOIN tenants t ON t.id = l.tenant_id
            JOIN units u ON u.id = l.unit_id
            WHERE 1=1
            "#,
        );
        push_filters(&mut count_qb, filter);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::new(LEASE_DETAIL_SELECT);
        qb.push(" WHERE 1=1");
        push_filters(&mut qb, filter);
        qb.push(" ORDER BY l.end_date DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());
        let leases = qb.build_query_as::<LeaseDetail>().fetch_all(&self.pool).await?;

        Ok((leases, total))
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<LeaseDetail>, AppError> {
        let sql = format!("{} WHERE l.id = $1", LEASE_DETAIL_SELECT);
        let lease = sqlx::query_as::<_, LeaseDetail>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(lease)
    }

    pub async fn find_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Lease>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lease = sqlx::query_as::<_, Lease>("SELECT * FROM leases WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(lease)
    }

    /// Existe contrato ativo (estado activo e não vencido em `today`) na unidade, ignorando `exclude`?
    pub async fn has_active_lease<'e, E>(
        &self,
        executor: E,
        unit_id: Uuid,
        exclude: Option<Uuid>,
        today: NaiveDate,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM leases
                WHERE unit_id = $1
                  AND status = 'activo'
                  AND end_date >= $3
                  AND ($2::uuid IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(unit_id)
        .bind(exclude)
        .bind(today)
        .fetch_one(executor)
        .await?;
        Ok(exists)
    }

    pub async fn find_active_for_unit<'e, E>(
        &self,
        executor: E,
        unit_id: Uuid,
        today: NaiveDate,
    ) -> Result<Option<Lease>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lease = sqlx::query_as::<_, Lease>(
            r#"
            SELECT * FROM leases
            WHERE unit_id = $1 AND status = 'activo' AND end_date >= $2
            ORDER BY end_date DESC
            LIMIT 1
            "#,
        )
        .bind(unit_id)
        .bind(today)
        .fetch_optional(executor)
        .await?;
        Ok(lease)
    }

    pub async fn create<'e, E>(&self, executor: E, record: &LeaseRecord) -> Result<Lease, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Lease>(
            r#"
            INSERT INTO leases (tenant_id, unit_id, start_date, end_date, rent_amount,
                                currency, due_day, deposit, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(record.tenant_id)
        .bind(record.unit_id)
        .bind(record.start_date)
        .bind(record.end_date)
        .bind(record.rent_amount)
        .bind(record.currency)
        .bind(record.due_day)
        .bind(record.deposit)
        .bind(record.status)
        .fetch_one(executor)
        .await
        .map_err(|e| map_write_error(e, |_| None))
    }

    pub async fn update<'e, E>(&self, executor: E, id: Uuid, record: &LeaseRecord) -> Result<Option<Lease>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Lease>(
            r#"
            UPDATE leases
            SET tenant_id = $2, unit_id = $3, start_date = $4, end_date = $5, rent_amount = $6,
                currency = $7, due_day = $8, deposit = $9, status = $10, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(record.tenant_id)
        .bind(record.unit_id)
        .bind(record.start_date)
        .bind(record.end_date)
        .bind(record.rent_amount)
        .bind(record.currency)
        .bind(record.due_day)
        .bind(record.deposit)
        .bind(record.status)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_write_error(e, |_| None))
    }

    pub async fn set_status<'e, E>(&self, executor: E, id: Uuid, status: LeaseStatus) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE leases SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM leases WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_delete_error)?;
        Ok(result.rows_affected() > 0)
    }

    // Contratos ativos que vencem nos próximos `days` dias
    pub async fn expiring_within(&self, days: i32) -> Result<Vec<ExpiringLease>, AppError> {
        let leases = sqlx::query_as::<_, ExpiringLease>(
            r#"
            SELECT l.id, l.end_date,
                   t.first_name || ' ' || t.last_name AS tenant_name,
                   u.number AS unit_number, u.unit_type,
                   l.rent_amount, l.currency,
                   (l.end_date - CURRENT_DATE) AS days_left
            FROM leases l
            JOIN tenants t ON t.id = l.tenant_id
            JOIN units u ON u.id = l.unit_id
            WHERE l.status = 'activo'
              AND l.end_date BETWEEN CURRENT_DATE AND CURRENT_DATE + $1
            ORDER BY l.end_date ASC
            "#,
        )
        .bind(days)
        .fetch_all(&self.pool)
        .await?;
        Ok(leases)
    }
}

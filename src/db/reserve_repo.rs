// src/db/reserve_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{db_utils::map_delete_error, error::AppError, pagination::PageRequest},
    models::{
        common::Currency,
        reserve::{
            Reserve, ReserveBalance, ReserveFilter, ReserveOrigin, ReserveOriginSummary,
            ReservePayload, ReserveStatus,
        },
    },
};

// Valores de uma reserva nova (cadastro manual ou saldo de um consumo parcial)
#[derive(Debug, Clone, PartialEq)]
pub struct ReserveRecord {
    pub description: String,
    pub amount: Decimal,
    pub currency: Currency,
    pub origin: ReserveOrigin,
    pub status: ReserveStatus,
    pub created_date: NaiveDate,
    pub notes: Option<String>,
}

// Como a reserva consumida fica gravada
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsumedReserve {
    pub amount: Decimal,
    pub status: ReserveStatus,
}

#[derive(Clone)]
pub struct ReserveRepository {
    pool: PgPool,
}

impl ReserveRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: &ReserveFilter, page: PageRequest) -> Result<(Vec<Reserve>, i64), AppError> {
        fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &ReserveFilter) {
            if let Some(status) = filter.status {
                qb.push(" AND status = ").push_bind(status);
            }
            if let Some(origin) = filter.origin {
                qb.push(" AND origin = ").push_bind(origin);
            }
            if let Some(currency) = filter.currency {
                qb.push(" AND currency = ").push_bind(currency);
            }
        }

        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM reserves WHERE 1=1");
        push_filters(&mut count_qb, filter);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::new("SELECT * FROM reserves WHERE 1=1");
        push_filters(&mut qb, filter);
        qb.push(" ORDER BY created_date DESC, created_at DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());
        let reserves = qb.build_query_as::<Reserve>().fetch_all(&self.pool).await?;

        Ok((reserves, total))
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<Reserve>, AppError> {
        let reserve = sqlx::query_as::<_, Reserve>("SELECT * FROM reserves WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(reserve)
    }

    pub async fn find_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Reserve>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let reserve = sqlx::query_as::<_, Reserve>("SELECT * FROM reserves WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(reserve)
    }

    pub async fn create<'e, E>(&self, executor: E, record: &ReserveRecord) -> Result<Reserve, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let reserve = sqlx::query_as::<_, Reserve>(
            r#"
            INSERT INTO reserves (description, amount, currency, origin, status, created_date, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&record.description)
        .bind(record.amount)
        .bind(record.currency)
        .bind(record.origin)
        .bind(record.status)
        .bind(record.created_date)
        .bind(record.notes.as_deref())
        .fetch_one(executor)
        .await?;
        Ok(reserve)
    }

    pub async fn update(&self, id: Uuid, payload: &ReservePayload) -> Result<Option<Reserve>, AppError> {
        let reserve = sqlx::query_as::<_, Reserve>(
            r#"
            UPDATE reserves
            SET description = $2, amount = $3, currency = $4, origin = COALESCE($5, origin),
                status = COALESCE($6, status), created_date = $7, notes = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payload.description.trim())
        .bind(payload.amount)
        .bind(payload.currency)
        .bind(payload.origin)
        .bind(payload.status)
        .bind(payload.created_date)
        .bind(payload.notes.as_deref())
        .fetch_optional(&self.pool)
        .await?;
        Ok(reserve)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM reserves WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_delete_error)?;
        Ok(result.rows_affected() > 0)
    }

    /// Fecha a reserva com o valor efetivamente consumido.
    pub async fn mark_used<'e, E>(&self, executor: E, id: Uuid, consumed: &ConsumedReserve) -> Result<Reserve, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let reserve = sqlx::query_as::<_, Reserve>(
            r#"
            UPDATE reserves
            SET amount = $2, status = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(consumed.amount)
        .bind(consumed.status)
        .fetch_one(executor)
        .await?;
        Ok(reserve)
    }

    pub async fn balances(&self) -> Result<Vec<ReserveBalance>, AppError> {
        let balances = sqlx::query_as::<_, ReserveBalance>(
            r#"
            SELECT currency, COALESCE(SUM(amount), 0) AS total
            FROM reserves
            WHERE status = 'disponible'
            GROUP BY currency
            ORDER BY currency
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(balances)
    }

    pub async fn summary_by_origin(&self) -> Result<Vec<ReserveOriginSummary>, AppError> {
        let summary = sqlx::query_as::<_, ReserveOriginSummary>(
            r#"
            SELECT origin,
                   COUNT(*) AS count,
                   COALESCE(SUM(amount) FILTER (WHERE status = 'disponible'), 0) AS available,
                   COALESCE(SUM(amount) FILTER (WHERE status = 'usado'), 0) AS used,
                   COALESCE(SUM(amount), 0) AS total
            FROM reserves
            GROUP BY origin
            ORDER BY origin
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(summary)
    }

    pub async fn available(&self, currency: Currency, min_amount: Option<Decimal>) -> Result<Vec<Reserve>, AppError> {
        let reserves = sqlx::query_as::<_, Reserve>(
            r#"
            SELECT * FROM reserves
            WHERE status = 'disponible' AND currency = $1 AND ($2::NUMERIC IS NULL OR amount >= $2)
            ORDER BY created_date, created_at
            "#,
        )
        .bind(currency)
        .bind(min_amount)
        .fetch_all(&self.pool)
        .await?;
        Ok(reserves)
    }
}

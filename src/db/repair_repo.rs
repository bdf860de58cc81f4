// src/db/repair_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{like_pattern, map_delete_error, map_write_error},
        error::AppError,
        pagination::PageRequest,
    },
    models::repair::{FundingSource, Repair, RepairDetail, RepairFilter, RepairPayload, RepairStatus},
};

const REPAIR_DETAIL_SELECT: &str = r#"
    SELECT r.*, u.number AS unit_number
    FROM repairs r
    LEFT JOIN units u ON u.id = r.unit_id
"#;

#[derive(Clone)]
pub struct RepairRepository {
    pool: PgPool,
}

impl RepairRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: &RepairFilter, page: PageRequest) -> Result<(Vec<RepairDetail>, i64), AppError> {
        fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &RepairFilter) {
            if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
                let pattern = like_pattern(search);
                qb.push(" AND (r.description ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR r.responsible ILIKE ")
                    .push_bind(pattern)
                    .push(")");
            }
            if let Some(status) = filter.status {
                qb.push(" AND r.status = ").push_bind(status);
            }
            if let Some(source) = filter.funding_source {
                qb.push(" AND r.funding_source = ").push_bind(source);
            }
        }

        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM repairs r WHERE 1=1");
        push_filters(&mut count_qb, filter);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::new(REPAIR_DETAIL_SELECT);
        qb.push(" WHERE 1=1");
        push_filters(&mut qb, filter);
        qb.push(" ORDER BY r.reported_date DESC, r.created_at DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());
        let repairs = qb.build_query_as::<RepairDetail>().fetch_all(&self.pool).await?;

        Ok((repairs, total))
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<RepairDetail>, AppError> {
        let sql = format!("{} WHERE r.id = $1", REPAIR_DETAIL_SELECT);
        let repair = sqlx::query_as::<_, RepairDetail>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(repair)
    }

    pub async fn find_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Repair>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let repair = sqlx::query_as::<_, Repair>("SELECT * FROM repairs WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(repair)
    }

    pub async fn create(&self, payload: &RepairPayload) -> Result<Repair, AppError> {
        sqlx::query_as::<_, Repair>(
            r#"
            INSERT INTO repairs (unit_id, description, reported_date, execution_date, responsible,
                                 estimated_amount, spent_amount, currency, status, funding_source, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(payload.unit_id)
        .bind(payload.description.trim())
        .bind(payload.reported_date)
        .bind(payload.execution_date)
        .bind(payload.responsible.trim())
        .bind(payload.estimated_amount)
        .bind(payload.spent_amount)
        .bind(payload.currency)
        .bind(payload.status.unwrap_or(RepairStatus::Pendiente))
        .bind(payload.funding_source.unwrap_or(FundingSource::Otro))
        .bind(payload.notes.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, |_| None))
    }

    // Campos opcionais ausentes mantêm o valor atual
    pub async fn update(&self, id: Uuid, payload: &RepairPayload) -> Result<Option<Repair>, AppError> {
        sqlx::query_as::<_, Repair>(
            r#"
            UPDATE repairs
            SET unit_id = $2, description = $3, reported_date = $4, execution_date = $5,
                responsible = $6, estimated_amount = $7, spent_amount = $8, currency = $9,
                status = COALESCE($10, status), funding_source = COALESCE($11, funding_source),
                notes = $12, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payload.unit_id)
        .bind(payload.description.trim())
        .bind(payload.reported_date)
        .bind(payload.execution_date)
        .bind(payload.responsible.trim())
        .bind(payload.estimated_amount)
        .bind(payload.spent_amount)
        .bind(payload.currency)
        .bind(payload.status)
        .bind(payload.funding_source)
        .bind(payload.notes.as_deref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, |_| None))
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM repairs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_delete_error)?;
        Ok(result.rows_affected() > 0)
    }

    /// Marca a reparação como financiada pela reserva e soma o valor gasto.
    pub async fn mark_funded_by_reserve<'e, E>(&self, executor: E, id: Uuid, amount: Decimal) -> Result<Repair, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let repair = sqlx::query_as::<_, Repair>(
            r#"
            UPDATE repairs
            SET funding_source = 'reserva', spent_amount = spent_amount + $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(amount)
        .fetch_one(executor)
        .await?;
        Ok(repair)
    }
}

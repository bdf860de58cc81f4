// src/db/payment_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{like_pattern, map_write_error, period_bounds},
        error::AppError,
        pagination::PageRequest,
    },
    models::payment::{NewPayment, Payment, PaymentDetail, PaymentFilter},
};

const PAYMENT_DETAIL_SELECT: &str = r#"
    SELECT p.*,
           t.first_name || ' ' || t.last_name AS tenant_name,
           u.number AS unit_number
    FROM payments p
    LEFT JOIN tenants t ON t.id = p.tenant_id
    LEFT JOIN units u ON u.id = p.unit_id
"#;

// Intervalo de datas do filtro: mês específico ou o ano inteiro
fn filter_range(filter: &PaymentFilter) -> Option<(NaiveDate, NaiveDate)> {
    match (filter.year, filter.month) {
        (Some(year), Some(month)) => period_bounds(year, month),
        (Some(year), None) => {
            let (first, _) = period_bounds(year, 1)?;
            let (_, last) = period_bounds(year, 12)?;
            Some((first, last))
        }
        _ => None,
    }
}

#[derive(Clone)]
pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: &PaymentFilter, page: PageRequest) -> Result<(Vec<PaymentDetail>, i64), AppError> {
        fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &PaymentFilter) {
            if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
                let pattern = like_pattern(search);
                qb.push(" AND (t.first_name ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR t.last_name ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR u.number ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR p.reference ILIKE ")
                    .push_bind(pattern)
                    .push(")");
            }
            if let Some(payment_type) = filter.payment_type {
                qb.push(" AND p.payment_type = ").push_bind(payment_type);
            }
            if let Some(method) = filter.method {
                qb.push(" AND p.method = ").push_bind(method);
            }
            if let Some(currency) = filter.currency {
                qb.push(" AND p.currency = ").push_bind(currency);
            }
            if let Some((from, to)) = filter_range(filter) {
                qb.push(" AND p.payment_date BETWEEN ")
                    .push_bind(from)
                    .push(" AND ")
                    .push_bind(to);
            }
        }

        let mut count_qb = QueryBuilder::new(
            r#"
            SELECT COUNT(*) FROM payments p
            LEFT JOIN tenants t ON t.id = p.tenant_id
            LEFT JOIN units u ON u.id = p.unit_id
            WHERE 1=1
            "#,
        );
        push_filters(&mut count_qb, filter);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::new(PAYMENT_DETAIL_SELECT);
        qb.push(" WHERE 1=1");
        push_filters(&mut qb, filter);
        qb.push(" ORDER BY p.payment_date DESC, p.created_at DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());
        let payments = qb.build_query_as::<PaymentDetail>().fetch_all(&self.pool).await?;

        Ok((payments, total))
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<PaymentDetail>, AppError> {
        let sql = format!("{} WHERE p.id = $1", PAYMENT_DETAIL_SELECT);
        let payment = sqlx::query_as::<_, PaymentDetail>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(payment)
    }

    pub async fn create<'e, E>(&self, executor: E, new: &NewPayment) -> Result<Payment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (payment_type, tenant_id, unit_id, lease_id, amount, currency,
                                  payment_date, method, reference, description, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(new.payment_type)
        .bind(new.tenant_id)
        .bind(new.unit_id)
        .bind(new.lease_id)
        .bind(new.amount)
        .bind(new.currency)
        .bind(new.payment_date)
        .bind(new.method)
        .bind(new.reference.as_deref())
        .bind(new.description.as_deref())
        .bind(new.created_by)
        .fetch_one(executor)
        .await
        .map_err(|e| map_write_error(e, |_| None))
    }

    pub async fn update<'e, E>(&self, executor: E, id: Uuid, new: &NewPayment) -> Result<Option<Payment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Payment>(
            r#"
            UPDATE payments
            SET payment_type = $2, tenant_id = $3, unit_id = $4, lease_id = $5, amount = $6,
                currency = $7, payment_date = $8, method = $9, reference = $10, description = $11
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(new.payment_type)
        .bind(new.tenant_id)
        .bind(new.unit_id)
        .bind(new.lease_id)
        .bind(new.amount)
        .bind(new.currency)
        .bind(new.payment_date)
        .bind(new.method)
        .bind(new.reference.as_deref())
        .bind(new.description.as_deref())
        .fetch_optional(executor)
        .await
        .map_err(|e| map_write_error(e, |_| None))
    }

    // Devolve a linha apagada (para remover o comprovante do disco)
    pub async fn delete(&self, id: Uuid) -> Result<Option<Payment>, AppError> {
        let payment = sqlx::query_as::<_, Payment>("DELETE FROM payments WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(payment)
    }

    pub async fn set_receipt(&self, id: Uuid, file_name: &str) -> Result<Option<Payment>, AppError> {
        let payment = sqlx::query_as::<_, Payment>(
            "UPDATE payments SET receipt = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(file_name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(payment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(year: Option<i32>, month: Option<u32>) -> PaymentFilter {
        PaymentFilter {
            search: None,
            payment_type: None,
            method: None,
            month,
            year,
            currency: None,
            page: None,
            per_page: None,
        }
    }

    #[test]
    fn test_filter_range_by_month_or_year() {
        let (from, to) = filter_range(&filter(Some(2025), Some(2))).unwrap();
        assert_eq!(from, NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
        assert_eq!(to, NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());

        let (from, to) = filter_range(&filter(Some(2025), None)).unwrap();
        assert_eq!(from, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(to, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());

        assert!(filter_range(&filter(None, Some(3))).is_none());
    }
}

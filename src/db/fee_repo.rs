// src/db/fee_repo.rs

use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{like_pattern, map_write_error},
        error::AppError,
        pagination::PageRequest,
    },
    models::fee::{
        ExpenseCategory, Fee, FeeDetail, FeeFilter, FeeItem, FeeItemDetail, FeeItemPayload,
        FeePayload, FeeStatus,
    },
};

fn unique_fee_constraint(constraint: &str) -> Option<AppError> {
    match constraint {
        "fees_unit_period_key" => Some(AppError::FeePeriodAlreadyExists),
        "expense_categories_name_key" => Some(AppError::CategoryAlreadyExists),
        _ => None,
    }
}

const FEE_DETAIL_SELECT: &str = r#"
    SELECT f.*, u.number AS unit_number, u.unit_type
    FROM fees f
    JOIN units u ON u.id = f.unit_id
"#;

// Expensas, seus movimentos e as categorias de gasto
#[derive(Clone)]
pub struct FeeRepository {
    pool: PgPool,
}

impl FeeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: &FeeFilter, page: PageRequest) -> Result<(Vec<FeeDetail>, i64), AppError> {
        fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &FeeFilter) {
            if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
                qb.push(" AND u.number ILIKE ").push_bind(like_pattern(search));
            }
            if let Some(status) = filter.status {
                qb.push(" AND f.status = ").push_bind(status);
            }
            if let Some(month) = filter.month {
                qb.push(" AND f.month = ").push_bind(month);
            }
            if let Some(year) = filter.year {
                qb.push(" AND f.year = ").push_bind(year);
            }
        }

        let mut count_qb =
            QueryBuilder::new("SELECT COUNT(*) FROM fees f JOIN units u ON u.id = f.unit_id WHERE 1=1");
        push_filters(&mut count_qb, filter);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::new(FEE_DETAIL_SELECT);
        qb.push(" WHERE 1=1");
        push_filters(&mut qb, filter);
        qb.push(" ORDER BY f.year DESC, f.month DESC, u.number LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());
        let fees = qb.build_query_as::<FeeDetail>().fetch_all(&self.pool).await?;

        Ok((fees, total))
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<FeeDetail>, AppError> {
        let sql = format!("{} WHERE f.id = $1", FEE_DETAIL_SELECT);
        let fee = sqlx::query_as::<_, FeeDetail>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(fee)
    }

    pub async fn items(&self, fee_id: Uuid) -> Result<Vec<FeeItemDetail>, AppError> {
        let items = sqlx::query_as::<_, FeeItemDetail>(
            r#"
            SELECT fi.*, c.name AS category_name
            FROM fee_items fi
            LEFT JOIN expense_categories c ON c.id = fi.category_id
            WHERE fi.fee_id = $1
            ORDER BY c.name NULLS LAST, fi.description
            "#,
        )
        .bind(fee_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    pub async fn create<'e, E>(&self, executor: E, payload: &FeePayload, status: FeeStatus) -> Result<Fee, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Fee>(
            r#"
            INSERT INTO fees (unit_id, year, month, total_amount, due_date, status, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(payload.unit_id)
        .bind(payload.year)
        .bind(payload.month)
        .bind(payload.total_amount)
        .bind(payload.due_date)
        .bind(status)
        .bind(payload.notes.as_deref())
        .fetch_one(executor)
        .await
        .map_err(|e| map_write_error(e, unique_fee_constraint))
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &FeePayload,
        status: FeeStatus,
    ) -> Result<Option<Fee>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Fee>(
            r#"
            UPDATE fees
            SET unit_id = $2, year = $3, month = $4, total_amount = $5, due_date = $6,
                status = $7, notes = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payload.unit_id)
        .bind(payload.year)
        .bind(payload.month)
        .bind(payload.total_amount)
        .bind(payload.due_date)
        .bind(status)
        .bind(payload.notes.as_deref())
        .fetch_optional(executor)
        .await
        .map_err(|e| map_write_error(e, unique_fee_constraint))
    }

    pub async fn insert_item<'e, E>(&self, executor: E, fee_id: Uuid, item: &FeeItemPayload) -> Result<FeeItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, FeeItem>(
            r#"
            INSERT INTO fee_items (fee_id, category_id, description, amount)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(fee_id)
        .bind(item.category_id)
        .bind(item.description.trim())
        .bind(item.amount)
        .fetch_one(executor)
        .await
        .map_err(|e| map_write_error(e, |_| None))
    }

    pub async fn delete_items<'e, E>(&self, executor: E, fee_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM fee_items WHERE fee_id = $1")
            .bind(fee_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM fees WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn set_status<'e, E>(&self, executor: E, id: Uuid, status: FeeStatus) -> Result<Option<Fee>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let fee = sqlx::query_as::<_, Fee>(
            "UPDATE fees SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(executor)
        .await?;
        Ok(fee)
    }

    /// Expensa em aberto (pendiente/vencida) da unidade no período, travada para update.
    pub async fn find_open_for_period<'e, E>(
        &self,
        executor: E,
        unit_id: Uuid,
        year: i32,
        month: i32,
    ) -> Result<Option<Fee>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let fee = sqlx::query_as::<_, Fee>(
            r#"
            SELECT * FROM fees
            WHERE unit_id = $1 AND year = $2 AND month = $3
              AND status IN ('pendiente', 'vencida')
            FOR UPDATE
            "#,
        )
        .bind(unit_id)
        .bind(year)
        .bind(month)
        .fetch_optional(executor)
        .await?;
        Ok(fee)
    }

    // pendiente com vencimento no passado -> vencida
    pub async fn mark_overdue(&self) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE fees SET status = 'vencida', updated_at = NOW()
            WHERE status = 'pendiente' AND due_date < CURRENT_DATE
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    // ---
    // Categorias de gasto
    // ---

    pub async fn list_categories(&self) -> Result<Vec<ExpenseCategory>, AppError> {
        let categories = sqlx::query_as::<_, ExpenseCategory>("SELECT * FROM expense_categories ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(categories)
    }

    pub async fn create_category(&self, name: &str) -> Result<ExpenseCategory, AppError> {
        sqlx::query_as::<_, ExpenseCategory>("INSERT INTO expense_categories (name) VALUES ($1) RETURNING *")
            .bind(name.trim())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, unique_fee_constraint))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use rstest::rstest;

    use super::*;
    use crate::{common::i18n::I18nStore, middleware::i18n::Locale};

    #[test]
    fn test_duplicate_period_is_a_conflict() {
        let err = unique_fee_constraint("fees_unit_period_key").expect("constraint conhecida");
        assert!(matches!(err, AppError::FeePeriodAlreadyExists));

        let store = I18nStore::load_embedded().expect("catálogos embutidos válidos");
        let api = err.to_api_error(&Locale("es".into()), &store);
        assert_eq!(api.status, StatusCode::CONFLICT);
        assert_ne!(api.error, "error.fee_period_exists");
    }

    #[rstest]
    #[case("expense_categories_name_key", true)]
    #[case("fees_pkey", false)]
    #[case("units_building_number_key", false)]
    fn test_only_fee_constraints_are_mapped(#[case] constraint: &str, #[case] mapped: bool) {
        assert_eq!(unique_fee_constraint(constraint).is_some(), mapped);
    }
}

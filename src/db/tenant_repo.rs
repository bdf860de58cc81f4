// src/db/tenant_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{like_pattern, map_delete_error, map_write_error},
        error::AppError,
        pagination::PageRequest,
    },
    models::tenant::{Tenant, TenantFilter},
};

fn unique_tenant_constraint(constraint: &str) -> Option<AppError> {
    match constraint {
        "tenants_dni_key" => Some(AppError::DniAlreadyExists),
        _ => None,
    }
}

// Dados já normalizados pelo service
pub struct TenantRecord<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub dni: &'a str,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub notes: Option<&'a str>,
}

#[derive(Clone)]
pub struct TenantRepository {
    pool: PgPool,
}

impl TenantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: &TenantFilter, page: PageRequest) -> Result<(Vec<Tenant>, i64), AppError> {
        fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &TenantFilter) {
            if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
                let pattern = like_pattern(search);
                qb.push(" AND (first_name ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR last_name ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR dni ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR email ILIKE ")
                    .push_bind(pattern)
                    .push(")");
            }
        }

        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM tenants WHERE 1=1");
        push_filters(&mut count_qb, filter);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::new("SELECT * FROM tenants WHERE 1=1");
        push_filters(&mut qb, filter);
        qb.push(" ORDER BY last_name, first_name LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());
        let tenants = qb.build_query_as::<Tenant>().fetch_all(&self.pool).await?;

        Ok((tenants, total))
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<Tenant>, AppError> {
        let tenant = sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tenant)
    }

    pub async fn create(&self, record: &TenantRecord<'_>) -> Result<Tenant, AppError> {
        sqlx::query_as::<_, Tenant>(
            r#"
            INSERT INTO tenants (first_name, last_name, dni, email, phone, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(record.first_name)
        .bind(record.last_name)
        .bind(record.dni)
        .bind(record.email)
        .bind(record.phone)
        .bind(record.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, unique_tenant_constraint))
    }

    pub async fn update(&self, id: Uuid, record: &TenantRecord<'_>) -> Result<Option<Tenant>, AppError> {
        sqlx::query_as::<_, Tenant>(
            r#"
            UPDATE tenants
            SET first_name = $2, last_name = $3, dni = $4, email = $5, phone = $6, notes = $7,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(record.first_name)
        .bind(record.last_name)
        .bind(record.dni)
        .bind(record.email)
        .bind(record.phone)
        .bind(record.notes)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, unique_tenant_constraint))
    }

    pub async fn count_active_leases<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        today: NaiveDate,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM leases
            WHERE tenant_id = $1 AND status = 'activo' AND end_date >= $2
            "#,
        )
        .bind(tenant_id)
        .bind(today)
        .fetch_one(executor)
        .await?;
        Ok(total)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM tenants WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(map_delete_error)?;
        Ok(result.rows_affected() > 0)
    }
}

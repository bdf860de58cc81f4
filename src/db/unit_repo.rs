// src/db/unit_repo.rs

use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{map_delete_error, map_write_error},
        error::AppError,
    },
    models::unit::{Building, BuildingPayload, Unit, UnitDetail, UnitFilter, UnitPayload},
};

fn unique_unit_constraint(constraint: &str) -> Option<AppError> {
    match constraint {
        "units_building_number_key" => Some(AppError::UnitNumberAlreadyExists),
        _ => None,
    }
}

const UNIT_DETAIL_SELECT: &str = r#"
    SELECT u.*, b.name AS building_name
    FROM units u
    JOIN buildings b ON b.id = u.building_id
"#;

// Edifícios e unidades
#[derive(Clone)]
pub struct UnitRepository {
    pool: PgPool,
}

impl UnitRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Edifícios
    // ---

    pub async fn list_buildings(&self) -> Result<Vec<Building>, AppError> {
        let buildings = sqlx::query_as::<_, Building>("SELECT * FROM buildings ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(buildings)
    }

    pub async fn create_building(&self, payload: &BuildingPayload) -> Result<Building, AppError> {
        let building = sqlx::query_as::<_, Building>(
            "INSERT INTO buildings (name, address) VALUES ($1, $2) RETURNING *",
        )
        .bind(payload.name.trim())
        .bind(payload.address.trim())
        .fetch_one(&self.pool)
        .await?;
        Ok(building)
    }

    pub async fn update_building(&self, id: Uuid, payload: &BuildingPayload) -> Result<Option<Building>, AppError> {
        let building = sqlx::query_as::<_, Building>(
            "UPDATE buildings SET name = $2, address = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(payload.name.trim())
        .bind(payload.address.trim())
        .fetch_optional(&self.pool)
        .await?;
        Ok(building)
    }

    pub async fn delete_building(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM buildings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_delete_error)?;
        Ok(result.rows_affected() > 0)
    }

    // ---
    // Unidades
    // ---

    pub async fn list_units(&self, filter: &UnitFilter) -> Result<Vec<UnitDetail>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(UNIT_DETAIL_SELECT);
        qb.push(" WHERE 1=1");
        if let Some(building_id) = filter.building_id {
            qb.push(" AND u.building_id = ").push_bind(building_id);
        }
        if let Some(unit_type) = filter.unit_type {
            qb.push(" AND u.unit_type = ").push_bind(unit_type);
        }
        if let Some(active) = filter.active {
            qb.push(" AND u.active = ").push_bind(active);
        }
        qb.push(" ORDER BY b.name, u.number");

        let units = qb.build_query_as::<UnitDetail>().fetch_all(&self.pool).await?;
        Ok(units)
    }

    pub async fn find_unit(&self, id: Uuid) -> Result<Option<UnitDetail>, AppError> {
        let sql = format!("{} WHERE u.id = $1", UNIT_DETAIL_SELECT);
        let unit = sqlx::query_as::<_, UnitDetail>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(unit)
    }

    pub async fn create_unit(&self, payload: &UnitPayload) -> Result<Unit, AppError> {
        sqlx::query_as::<_, Unit>(
            r#"
            INSERT INTO units (building_id, number, unit_type, floor, active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(payload.building_id)
        .bind(payload.number.trim())
        .bind(payload.unit_type)
        .bind(payload.floor.as_deref())
        .bind(payload.active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, unique_unit_constraint))
    }

    pub async fn update_unit(&self, id: Uuid, payload: &UnitPayload) -> Result<Option<Unit>, AppError> {
        sqlx::query_as::<_, Unit>(
            r#"
            UPDATE units
            SET building_id = $2, number = $3, unit_type = $4, floor = $5, active = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payload.building_id)
        .bind(payload.number.trim())
        .bind(payload.unit_type)
        .bind(payload.floor.as_deref())
        .bind(payload.active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, unique_unit_constraint))
    }

    pub async fn delete_unit(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM units WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_delete_error)?;
        Ok(result.rows_affected() > 0)
    }

    /// Trava a linha da unidade até o fim da transação (serializa contratos concorrentes).
    pub async fn lock_unit<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let found = sqlx::query_scalar::<_, Uuid>("SELECT id FROM units WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(found.is_some())
    }
}

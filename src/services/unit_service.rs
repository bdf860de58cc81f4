// src/services/unit_service.rs

use chrono::Local;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{LeaseRepository, UnitRepository},
    models::unit::{Building, BuildingPayload, Unit, UnitDetail, UnitFilter, UnitPayload},
};

#[derive(Clone)]
pub struct UnitService {
    pool: PgPool,
    unit_repo: UnitRepository,
    lease_repo: LeaseRepository,
}

impl UnitService {
    pub fn new(pool: PgPool, unit_repo: UnitRepository, lease_repo: LeaseRepository) -> Self {
        Self { pool, unit_repo, lease_repo }
    }

    // --- Edifícios ---

    pub async fn list_buildings(&self) -> Result<Vec<Building>, AppError> {
        self.unit_repo.list_buildings().await
    }

    pub async fn create_building(&self, payload: &BuildingPayload) -> Result<Building, AppError> {
        self.unit_repo.create_building(payload).await
    }

    pub async fn update_building(&self, id: Uuid, payload: &BuildingPayload) -> Result<Building, AppError> {
        self.unit_repo
            .update_building(id, payload)
            .await?
            .ok_or(AppError::NotFound("building"))
    }

    pub async fn delete_building(&self, id: Uuid) -> Result<(), AppError> {
        if !self.unit_repo.delete_building(id).await? {
            return Err(AppError::NotFound("building"));
        }
        Ok(())
    }

    // --- Unidades ---

    pub async fn list_units(&self, filter: &UnitFilter) -> Result<Vec<UnitDetail>, AppError> {
        self.unit_repo.list_units(filter).await
    }

    pub async fn get_unit(&self, id: Uuid) -> Result<UnitDetail, AppError> {
        self.unit_repo.find_unit(id).await?.ok_or(AppError::NotFound("unit"))
    }

    pub async fn create_unit(&self, payload: &UnitPayload) -> Result<Unit, AppError> {
        self.unit_repo.create_unit(payload).await
    }

    pub async fn update_unit(&self, id: Uuid, payload: &UnitPayload) -> Result<Unit, AppError> {
        self.unit_repo
            .update_unit(id, payload)
            .await?
            .ok_or(AppError::NotFound("unit"))
    }

    pub async fn delete_unit(&self, id: Uuid) -> Result<(), AppError> {
        if self.lease_repo.has_active_lease(&self.pool, id, None, Local::now().date_naive()).await? {
            return Err(AppError::UnitHasActiveLease);
        }
        // Contratos antigos ainda apontam para a unidade: a FK responde com RecordInUse
        if !self.unit_repo.delete_unit(id).await? {
            return Err(AppError::NotFound("unit"));
        }
        Ok(())
    }
}

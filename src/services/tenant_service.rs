// src/services/tenant_service.rs

use chrono::Local;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{PageRequest, Paginated},
        validation::normalize_phone,
    },
    db::{tenant_repo::TenantRecord, TenantRepository},
    models::tenant::{Tenant, TenantFilter, TenantPayload},
};

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Clone)]
pub struct TenantService {
    pool: PgPool,
    tenant_repo: TenantRepository,
}

impl TenantService {
    pub fn new(pool: PgPool, tenant_repo: TenantRepository) -> Self {
        Self { pool, tenant_repo }
    }

    pub async fn list(&self, filter: &TenantFilter) -> Result<Paginated<Tenant>, AppError> {
        let page = PageRequest::new(filter.page, filter.per_page);
        let (tenants, total) = self.tenant_repo.list(filter, page).await?;
        Ok(Paginated::new(tenants, total, page))
    }

    pub async fn get(&self, id: Uuid) -> Result<Tenant, AppError> {
        self.tenant_repo.find(id).await?.ok_or(AppError::NotFound("tenant"))
    }

    pub async fn create(&self, payload: &TenantPayload) -> Result<Tenant, AppError> {
        let phone = payload.phone.as_deref().map(normalize_phone);
        let record = Self::record(payload, phone.as_deref());
        self.tenant_repo.create(&record).await
    }

    pub async fn update(&self, id: Uuid, payload: &TenantPayload) -> Result<Tenant, AppError> {
        let phone = payload.phone.as_deref().map(normalize_phone);
        let record = Self::record(payload, phone.as_deref());
        self.tenant_repo
            .update(id, &record)
            .await?
            .ok_or(AppError::NotFound("tenant"))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        if self.tenant_repo.count_active_leases(&mut *tx, id, Local::now().date_naive()).await? > 0 {
            return Err(AppError::TenantHasActiveLeases);
        }
        if !self.tenant_repo.delete(&mut *tx, id).await? {
            return Err(AppError::NotFound("tenant"));
        }

        tx.commit().await?;
        Ok(())
    }

    fn record<'a>(payload: &'a TenantPayload, phone: Option<&'a str>) -> TenantRecord<'a> {
        TenantRecord {
            first_name: payload.first_name.trim(),
            last_name: payload.last_name.trim(),
            dni: payload.dni.trim(),
            email: non_empty(payload.email.as_deref()),
            phone: non_empty(phone),
            notes: non_empty(payload.notes.as_deref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_trims_and_drops_blank_optionals() {
        let payload = TenantPayload {
            first_name: "  Ana ".into(),
            last_name: "López".into(),
            dni: " 30123456 ".into(),
            email: Some("   ".into()),
            phone: Some("(011) 4567-8901".into()),
            notes: None,
        };
        let phone = payload.phone.as_deref().map(normalize_phone);
        let record = TenantService::record(&payload, phone.as_deref());

        assert_eq!(record.first_name, "Ana");
        assert_eq!(record.dni, "30123456");
        assert_eq!(record.email, None);
        assert_eq!(record.phone, Some("01145678901"));
    }
}

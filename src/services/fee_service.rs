// src/services/fee_service.rs

use chrono::Local;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{PageRequest, Paginated},
    },
    db::FeeRepository,
    models::fee::{
        CategoryPayload, ExpenseCategory, Fee, FeeDetail, FeeFilter, FeeItemDetail, FeePayload,
        FeeStatus, FeeWithItems,
    },
};

#[derive(Clone)]
pub struct FeeService {
    pool: PgPool,
    fee_repo: FeeRepository,
}

impl FeeService {
    pub fn new(pool: PgPool, fee_repo: FeeRepository) -> Self {
        Self { pool, fee_repo }
    }

    pub async fn list(&self, filter: &FeeFilter) -> Result<Paginated<FeeDetail>, AppError> {
        let page = PageRequest::new(filter.page, filter.per_page);
        let (fees, total) = self.fee_repo.list(filter, page).await?;
        Ok(Paginated::new(fees, total, page))
    }

    pub async fn get(&self, id: Uuid) -> Result<FeeWithItems, AppError> {
        let fee = self.fee_repo.find(id).await?.ok_or(AppError::NotFound("fee"))?;
        let items = self.fee_repo.items(id).await?;
        Ok(FeeWithItems { fee, items })
    }

    pub async fn items(&self, id: Uuid) -> Result<Vec<FeeItemDetail>, AppError> {
        if self.fee_repo.find(id).await?.is_none() {
            return Err(AppError::NotFound("fee"));
        }
        self.fee_repo.items(id).await
    }

    /// Cria a expensa e os movimentos válidos numa única transação.
    pub async fn create(&self, payload: &FeePayload) -> Result<Fee, AppError> {
        let status = FeeStatus::initial(payload.due_date, Local::now().date_naive());

        let mut tx = self.pool.begin().await?;

        let fee = self.fee_repo.create(&mut *tx, payload, status).await?;
        for item in payload.usable_items() {
            self.fee_repo.insert_item(&mut *tx, fee.id, item).await?;
        }

        tx.commit().await?;
        Ok(fee)
    }

    /// Atualiza a expensa e substitui todos os movimentos.
    pub async fn update(&self, id: Uuid, payload: &FeePayload) -> Result<Fee, AppError> {
        let current = self.fee_repo.find(id).await?.ok_or(AppError::NotFound("fee"))?;
        let status = payload.status.unwrap_or(current.fee.status);

        let mut tx = self.pool.begin().await?;

        let fee = self
            .fee_repo
            .update(&mut *tx, id, payload, status)
            .await?
            .ok_or(AppError::NotFound("fee"))?;
        self.fee_repo.delete_items(&mut *tx, id).await?;
        for item in payload.usable_items() {
            self.fee_repo.insert_item(&mut *tx, id, item).await?;
        }

        tx.commit().await?;
        Ok(fee)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        self.fee_repo.delete_items(&mut *tx, id).await?;
        if !self.fee_repo.delete(&mut *tx, id).await? {
            return Err(AppError::NotFound("fee"));
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn mark_paid(&self, id: Uuid) -> Result<Fee, AppError> {
        self.fee_repo
            .set_status(&self.pool, id, FeeStatus::Pagada)
            .await?
            .ok_or(AppError::NotFound("fee"))
    }

    pub async fn refresh_overdue(&self) -> Result<u64, AppError> {
        let updated = self.fee_repo.mark_overdue().await?;
        if updated > 0 {
            tracing::info!("⏰ {} expensas marcadas como vencidas", updated);
        }
        Ok(updated)
    }

    pub async fn list_categories(&self) -> Result<Vec<ExpenseCategory>, AppError> {
        self.fee_repo.list_categories().await
    }

    pub async fn create_category(&self, payload: &CategoryPayload) -> Result<ExpenseCategory, AppError> {
        self.fee_repo.create_category(&payload.name).await
    }
}

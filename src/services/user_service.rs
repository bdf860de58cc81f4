// src/services/user_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{PageRequest, Paginated},
    },
    db::{SessionRepository, UserRepository},
    models::auth::{CreateUserPayload, UpdateUserPayload, User, UserFilter, UserRole},
    services::auth::hash_password,
};

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
    user_repo: UserRepository,
    session_repo: SessionRepository,
}

impl UserService {
    pub fn new(pool: PgPool, user_repo: UserRepository, session_repo: SessionRepository) -> Self {
        Self { pool, user_repo, session_repo }
    }

    pub async fn list(&self, filter: &UserFilter) -> Result<Paginated<User>, AppError> {
        let page = PageRequest::new(filter.page, filter.per_page);
        let (users, total) = self.user_repo.list(filter, page).await?;
        Ok(Paginated::new(users, total, page))
    }

    pub async fn get(&self, id: Uuid) -> Result<User, AppError> {
        self.user_repo.find_by_id(id).await?.ok_or(AppError::NotFound("user"))
    }

    pub async fn create(&self, payload: &CreateUserPayload) -> Result<User, AppError> {
        let password_hash = hash_password(&payload.password).await?;
        self.user_repo
            .create(&self.pool, &payload.name, &payload.email, &password_hash, payload.role)
            .await
    }

    pub async fn update(&self, id: Uuid, payload: &UpdateUserPayload) -> Result<User, AppError> {
        let password_hash = match payload.password.as_deref().filter(|p| !p.is_empty()) {
            Some(password) => Some(hash_password(password).await?),
            None => None,
        };

        let user = self
            .user_repo
            .update(id, &payload.name, &payload.email, payload.role, payload.active, password_hash.as_deref())
            .await?
            .ok_or(AppError::NotFound("user"))?;

        // Usuário desativado ou com senha nova perde as sessões abertas
        if !user.active || password_hash.is_some() {
            self.session_repo.delete_for_user(user.id).await?;
        }

        Ok(user)
    }

    pub async fn delete(&self, id: Uuid, current_user: Uuid) -> Result<(), AppError> {
        if id == current_user {
            return Err(AppError::CannotDeleteSelf);
        }
        if !self.user_repo.delete(id).await? {
            return Err(AppError::NotFound("user"));
        }
        Ok(())
    }

    /// Cria o primeiro administrador quando a tabela de usuários está vazia.
    pub async fn ensure_admin(&self, email: &str, password: &str) -> Result<Option<User>, AppError> {
        if self.user_repo.count().await? > 0 {
            return Ok(None);
        }
        let password_hash = hash_password(password).await?;
        let admin = self
            .user_repo
            .create(&self.pool, "Administrador", email, &password_hash, UserRole::Admin)
            .await?;
        tracing::info!("👤 Administrador inicial criado: {}", admin.email);
        Ok(Some(admin))
    }
}

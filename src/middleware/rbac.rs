// src/middleware/rbac.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use std::marker::PhantomData;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::auth::UserRole,
};

/// Papel exigido por uma rota.
pub trait RoleDef: Send + Sync + 'static {
    fn role() -> UserRole;
}

/// Extractor que barra quem não tem o papel `T`.
pub struct RequireRole<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let locale = Locale::from_headers(&parts.headers);

        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| AppError::SessionRequired.to_api_error(&locale, &app_state.i18n_store))?;

        if user.0.role != T::role() {
            tracing::warn!("⛔ Usuário {} tentou acessar rota restrita a {:?}", user.0.id, T::role());
            return Err(AppError::AdminRequired.to_api_error(&locale, &app_state.i18n_store));
        }

        Ok(RequireRole(PhantomData))
    }
}

pub struct AdminRole;
impl RoleDef for AdminRole {
    fn role() -> UserRole {
        UserRole::Admin
    }
}

pub type RequireAdmin = RequireRole<AdminRole>;

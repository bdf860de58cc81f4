// src/handlers/tenants.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::{ApiError, AppError},
        pagination::Paginated,
    },
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::{
        audit::ClientInfo,
        tenant::{Tenant, TenantFilter, TenantPayload},
    },
};

// GET /api/tenants
#[utoipa::path(
    get,
    path = "/api/tenants",
    tag = "Tenants",
    params(TenantFilter),
    responses((status = 200, description = "Inquilinos (busca por nome, sobrenome, DNI ou e-mail)", body = Paginated<Tenant>)),
    security(("session_cookie" = []))
)]
pub async fn list_tenants(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<TenantFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let tenants = app_state
        .tenant_service
        .list(&filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(tenants)))
}

// GET /api/tenants/{id}
#[utoipa::path(
    get,
    path = "/api/tenants/{id}",
    tag = "Tenants",
    params(("id" = Uuid, Path, description = "ID do inquilino")),
    responses((status = 200, body = Tenant), (status = 404, description = "Inquilino não encontrado")),
    security(("session_cookie" = []))
)]
pub async fn get_tenant(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let tenant = app_state
        .tenant_service
        .get(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(tenant)))
}

// POST /api/tenants
#[utoipa::path(
    post,
    path = "/api/tenants",
    tag = "Tenants",
    request_body = TenantPayload,
    responses(
        (status = 201, body = Tenant),
        (status = 400, description = "DNI, e-mail ou telefone inválidos"),
        (status = 409, description = "DNI já cadastrado")
    ),
    security(("session_cookie" = []))
)]
pub async fn create_tenant(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    client: ClientInfo,
    Json(payload): Json<TenantPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let tenant = app_state
        .tenant_service
        .create(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .audit_service
        .record(user.id, "Crear inquilino", "tenants", Some(tenant.id.to_string()), &client)
        .await;

    Ok((StatusCode::CREATED, Json(tenant)))
}

// PUT /api/tenants/{id}
#[utoipa::path(
    put,
    path = "/api/tenants/{id}",
    tag = "Tenants",
    params(("id" = Uuid, Path, description = "ID do inquilino")),
    request_body = TenantPayload,
    responses(
        (status = 200, body = Tenant),
        (status = 404, description = "Inquilino não encontrado"),
        (status = 409, description = "DNI já cadastrado")
    ),
    security(("session_cookie" = []))
)]
pub async fn update_tenant(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    client: ClientInfo,
    Path(id): Path<Uuid>,
    Json(payload): Json<TenantPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let tenant = app_state
        .tenant_service
        .update(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .audit_service
        .record(user.id, "Actualizar inquilino", "tenants", Some(id.to_string()), &client)
        .await;

    Ok((StatusCode::OK, Json(tenant)))
}

// DELETE /api/tenants/{id}
#[utoipa::path(
    delete,
    path = "/api/tenants/{id}",
    tag = "Tenants",
    params(("id" = Uuid, Path, description = "ID do inquilino")),
    responses(
        (status = 204, description = "Inquilino removido"),
        (status = 409, description = "Inquilino com contratos ativos")
    ),
    security(("session_cookie" = []))
)]
pub async fn delete_tenant(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    client: ClientInfo,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .tenant_service
        .delete(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .audit_service
        .record(user.id, "Eliminar inquilino", "tenants", Some(id.to_string()), &client)
        .await;

    Ok(StatusCode::NO_CONTENT)
}

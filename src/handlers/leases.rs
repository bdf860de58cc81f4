// src/handlers/leases.rs

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
        lease::{ExpiringLease, ExpiringQuery, Lease, LeaseDetail, LeaseFilter, LeasePayload, RenewLeasePayload},
    },
};

// GET /api/leases
#[utoipa::path(
    get,
    path = "/api/leases",
    tag = "Leases",
    params(LeaseFilter),
    responses((status = 200, body = Paginated<LeaseDetail>)),
    security(("session_cookie" = []))
)]
pub async fn list_leases(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<LeaseFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let leases = app_state
        .lease_service
        .list(&filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(leases)))
}

// GET /api/leases/expiring
#[utoipa::path(
    get,
    path = "/api/leases/expiring",
    tag = "Leases",
    params(ExpiringQuery),
    responses((status = 200, description = "Contratos ativos que vencem na janela", body = Vec<ExpiringLease>)),
    security(("session_cookie" = []))
)]
pub async fn expiring_leases(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<ExpiringQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let leases = app_state
        .lease_service
        .expiring(query.days)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(leases)))
}

// GET /api/leases/{id}
#[utoipa::path(
    get,
    path = "/api/leases/{id}",
    tag = "Leases",
    params(("id" = Uuid, Path, description = "ID do contrato")),
    responses((status = 200, body = LeaseDetail), (status = 404, description = "Contrato não encontrado")),
    security(("session_cookie" = []))
)]
pub async fn get_lease(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let lease = app_state
        .lease_service
        .get(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(lease)))
}

// POST /api/leases
#[utoipa::path(
    post,
    path = "/api/leases",
    tag = "Leases",
    request_body = LeasePayload,
    responses(
        (status = 201, body = Lease),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "A unidade já tem contrato ativo")
    ),
    security(("session_cookie" = []))
)]
pub async fn create_lease(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    client: ClientInfo,
    Json(payload): Json<LeasePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let lease = app_state
        .lease_service
        .create(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .audit_service
        .record(user.id, "Crear contrato", "leases", Some(lease.id.to_string()), &client)
        .await;

    Ok((StatusCode::CREATED, Json(lease)))
}

// PUT /api/leases/{id}
#[utoipa::path(
    put,
    path = "/api/leases/{id}",
    tag = "Leases",
    params(("id" = Uuid, Path, description = "ID do contrato")),
    request_body = LeasePayload,
    responses(
        (status = 200, body = Lease),
        (status = 404, description = "Contrato não encontrado"),
        (status = 409, description = "A unidade já tem outro contrato ativo")
    ),
    security(("session_cookie" = []))
)]
pub async fn update_lease(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    client: ClientInfo,
    Path(id): Path<Uuid>,
    Json(payload): Json<LeasePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let lease = app_state
        .lease_service
        .update(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .audit_service
        .record(user.id, "Actualizar contrato", "leases", Some(id.to_string()), &client)
        .await;

    Ok((StatusCode::OK, Json(lease)))
}

// DELETE /api/leases/{id}
#[utoipa::path(
    delete,
    path = "/api/leases/{id}",
    tag = "Leases",
    params(("id" = Uuid, Path, description = "ID do contrato")),
    responses(
        (status = 204, description = "Contrato removido"),
        (status = 404, description = "Contrato não encontrado"),
        (status = 409, description = "Contrato com pagamentos vinculados")
    ),
    security(("session_cookie" = []))
)]
pub async fn delete_lease(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    client: ClientInfo,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .lease_service
        .delete(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .audit_service
        .record(user.id, "Eliminar contrato", "leases", Some(id.to_string()), &client)
        .await;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/leases/{id}/renew
#[utoipa::path(
    post,
    path = "/api/leases/{id}/renew",
    tag = "Leases",
    params(("id" = Uuid, Path, description = "ID do contrato a renovar")),
    request_body = RenewLeasePayload,
    responses(
        (status = 201, description = "Novo contrato, iniciando hoje", body = Lease),
        (status = 409, description = "O contrato não está ativo")
    ),
    security(("session_cookie" = []))
)]
pub async fn renew_lease(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    client: ClientInfo,
    Path(id): Path<Uuid>,
    Json(payload): Json<RenewLeasePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let lease = app_state
        .lease_service
        .renew(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .audit_service
        .record(user.id, "Renovar contrato", "leases", Some(lease.id.to_string()), &client)
        .await;

    Ok((StatusCode::CREATED, Json(lease)))
}

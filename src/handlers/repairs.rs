// src/handlers/repairs.rs

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
    middleware::{auth::AuthenticatedUser, i18n::Locale, rbac::RequireAdmin},
    models::{
        audit::ClientInfo,
        repair::{Repair, RepairDetail, RepairFilter, RepairPayload, ReserveUsage, UseReservePayload},
    },
};

// GET /api/repairs
#[utoipa::path(
    get,
    path = "/api/repairs",
    tag = "Repairs",
    params(RepairFilter),
    responses((status = 200, body = Paginated<RepairDetail>)),
    security(("session_cookie" = []))
)]
pub async fn list_repairs(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<RepairFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let repairs = app_state
        .repair_service
        .list(&filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(repairs)))
}

// GET /api/repairs/{id}
#[utoipa::path(
    get,
    path = "/api/repairs/{id}",
    tag = "Repairs",
    params(("id" = Uuid, Path, description = "ID da reparação")),
    responses((status = 200, body = RepairDetail), (status = 404, description = "Registro não encontrado")),
    security(("session_cookie" = []))
)]
pub async fn get_repair(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repair = app_state
        .repair_service
        .get(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(repair)))
}

// POST /api/repairs
#[utoipa::path(
    post,
    path = "/api/repairs",
    tag = "Repairs",
    request_body = RepairPayload,
    responses((status = 201, body = Repair), (status = 400, description = "Dados inválidos")),
    security(("session_cookie" = []))
)]
pub async fn create_repair(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    client: ClientInfo,
    Json(payload): Json<RepairPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let repair = app_state
        .repair_service
        .create(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .audit_service
        .record(user.id, "Crear reparación", "repairs", Some(repair.id.to_string()), &client)
        .await;

    Ok((StatusCode::CREATED, Json(repair)))
}

// PUT /api/repairs/{id}
#[utoipa::path(
    put,
    path = "/api/repairs/{id}",
    tag = "Repairs",
    params(("id" = Uuid, Path, description = "ID da reparação")),
    request_body = RepairPayload,
    responses((status = 200, body = Repair), (status = 404, description = "Registro não encontrado")),
    security(("session_cookie" = []))
)]
pub async fn update_repair(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    client: ClientInfo,
    Path(id): Path<Uuid>,
    Json(payload): Json<RepairPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let repair = app_state
        .repair_service
        .update(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .audit_service
        .record(user.id, "Actualizar reparación", "repairs", Some(id.to_string()), &client)
        .await;

    Ok((StatusCode::OK, Json(repair)))
}

// DELETE /api/repairs/{id}
#[utoipa::path(
    delete,
    path = "/api/repairs/{id}",
    tag = "Repairs",
    params(("id" = Uuid, Path, description = "ID da reparação")),
    responses((status = 204, description = "Reparação removida"), (status = 404, description = "Registro não encontrado")),
    security(("session_cookie" = []))
)]
pub async fn delete_repair(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    client: ClientInfo,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .repair_service
        .delete(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .audit_service
        .record(user.id, "Eliminar reparación", "repairs", Some(id.to_string()), &client)
        .await;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/repairs/{id}/use-reserve
#[utoipa::path(
    post,
    path = "/api/repairs/{id}/use-reserve",
    tag = "Repairs",
    params(("id" = Uuid, Path, description = "ID da reparação")),
    request_body = UseReservePayload,
    responses(
        (status = 200, description = "Reserva consumida (com saldo restante, se parcial)", body = ReserveUsage),
        (status = 403, description = "Apenas administradores"),
        (status = 409, description = "Reparação não elegível, reserva indisponível ou insuficiente")
    ),
    security(("session_cookie" = []))
)]
pub async fn use_reserve(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireAdmin,
    AuthenticatedUser(user): AuthenticatedUser,
    client: ClientInfo,
    Path(id): Path<Uuid>,
    Json(payload): Json<UseReservePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let usage = app_state
        .repair_service
        .use_reserve(id, &payload, user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .audit_service
        .record(user.id, "Usar reserva en reparación", "repairs", Some(id.to_string()), &client)
        .await;

    Ok((StatusCode::OK, Json(usage)))
}

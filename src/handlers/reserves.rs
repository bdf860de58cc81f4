// src/handlers/reserves.rs

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
        reserve::{
            AvailableReservesQuery, Reserve, ReserveBalance, ReserveFilter, ReserveOriginSummary, ReservePayload,
        },
    },
};

// GET /api/reserves
#[utoipa::path(
    get,
    path = "/api/reserves",
    tag = "Reserves",
    params(ReserveFilter),
    responses((status = 200, body = Paginated<Reserve>)),
    security(("session_cookie" = []))
)]
pub async fn list_reserves(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<ReserveFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let reserves = app_state
        .reserve_service
        .list(&filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(reserves)))
}

// GET /api/reserves/balance
#[utoipa::path(
    get,
    path = "/api/reserves/balance",
    tag = "Reserves",
    responses((status = 200, description = "Saldo disponível por moeda", body = Vec<ReserveBalance>)),
    security(("session_cookie" = []))
)]
pub async fn reserve_balance(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let balances = app_state
        .reserve_service
        .balances()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(balances)))
}

// GET /api/reserves/summary
#[utoipa::path(
    get,
    path = "/api/reserves/summary",
    tag = "Reserves",
    responses((status = 200, description = "Resumo por origem", body = Vec<ReserveOriginSummary>)),
    security(("session_cookie" = []))
)]
pub async fn reserve_summary(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let summary = app_state
        .reserve_service
        .summary_by_origin()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(summary)))
}

// GET /api/reserves/available
#[utoipa::path(
    get,
    path = "/api/reserves/available",
    tag = "Reserves",
    params(AvailableReservesQuery),
    responses((status = 200, description = "Reservas disponíveis na moeda", body = Vec<Reserve>)),
    security(("session_cookie" = []))
)]
pub async fn available_reserves(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<AvailableReservesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let reserves = app_state
        .reserve_service
        .available(query.currency, query.min_amount)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(reserves)))
}

// GET /api/reserves/{id}
#[utoipa::path(
    get,
    path = "/api/reserves/{id}",
    tag = "Reserves",
    params(("id" = Uuid, Path, description = "ID da reserva")),
    responses((status = 200, body = Reserve), (status = 404, description = "Registro não encontrado")),
    security(("session_cookie" = []))
)]
pub async fn get_reserve(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let reserve = app_state
        .reserve_service
        .get(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(reserve)))
}

// POST /api/reserves
#[utoipa::path(
    post,
    path = "/api/reserves",
    tag = "Reserves",
    request_body = ReservePayload,
    responses((status = 201, body = Reserve), (status = 400, description = "Dados inválidos"), (status = 403, description = "Apenas administradores")),
    security(("session_cookie" = []))
)]
pub async fn create_reserve(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireAdmin,
    AuthenticatedUser(user): AuthenticatedUser,
    client: ClientInfo,
    Json(payload): Json<ReservePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let reserve = app_state
        .reserve_service
        .create(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .audit_service
        .record(user.id, "Crear reserva", "reserves", Some(reserve.id.to_string()), &client)
        .await;

    Ok((StatusCode::CREATED, Json(reserve)))
}

// PUT /api/reserves/{id}
#[utoipa::path(
    put,
    path = "/api/reserves/{id}",
    tag = "Reserves",
    params(("id" = Uuid, Path, description = "ID da reserva")),
    request_body = ReservePayload,
    responses((status = 200, body = Reserve), (status = 404, description = "Registro não encontrado"), (status = 403, description = "Apenas administradores")),
    security(("session_cookie" = []))
)]
pub async fn update_reserve(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireAdmin,
    AuthenticatedUser(user): AuthenticatedUser,
    client: ClientInfo,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReservePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let reserve = app_state
        .reserve_service
        .update(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .audit_service
        .record(user.id, "Actualizar reserva", "reserves", Some(id.to_string()), &client)
        .await;

    Ok((StatusCode::OK, Json(reserve)))
}

// DELETE /api/reserves/{id}
#[utoipa::path(
    delete,
    path = "/api/reserves/{id}",
    tag = "Reserves",
    params(("id" = Uuid, Path, description = "ID da reserva")),
    responses((status = 204, description = "Reserva removida"), (status = 404, description = "Registro não encontrado"), (status = 403, description = "Apenas administradores")),
    security(("session_cookie" = []))
)]
pub async fn delete_reserve(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireAdmin,
    AuthenticatedUser(user): AuthenticatedUser,
    client: ClientInfo,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .reserve_service
        .delete(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .audit_service
        .record(user.id, "Eliminar reserva", "reserves", Some(id.to_string()), &client)
        .await;

    Ok(StatusCode::NO_CONTENT)
}

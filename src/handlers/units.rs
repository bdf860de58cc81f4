// src/handlers/units.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::{
        audit::ClientInfo,
        unit::{Building, BuildingPayload, Unit, UnitDetail, UnitFilter, UnitPayload},
    },
};

// ---
// Edifícios
// ---

#[utoipa::path(
    get,
    path = "/api/buildings",
    tag = "Units",
    responses((status = 200, body = Vec<Building>)),
    security(("session_cookie" = []))
)]
pub async fn list_buildings(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let buildings = app_state
        .unit_service
        .list_buildings()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(buildings)))
}

#[utoipa::path(
    post,
    path = "/api/buildings",
    tag = "Units",
    request_body = BuildingPayload,
    responses((status = 201, body = Building), (status = 400, description = "Dados inválidos")),
    security(("session_cookie" = []))
)]
pub async fn create_building(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    client: ClientInfo,
    Json(payload): Json<BuildingPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let building = app_state
        .unit_service
        .create_building(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .audit_service
        .record(user.id, "Crear edificio", "buildings", Some(building.id.to_string()), &client)
        .await;

    Ok((StatusCode::CREATED, Json(building)))
}

#[utoipa::path(
    put,
    path = "/api/buildings/{id}",
    tag = "Units",
    params(("id" = Uuid, Path, description = "ID do edifício")),
    request_body = BuildingPayload,
    responses((status = 200, body = Building), (status = 404, description = "Edifício não encontrado")),
    security(("session_cookie" = []))
)]
pub async fn update_building(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    client: ClientInfo,
    Path(id): Path<Uuid>,
    Json(payload): Json<BuildingPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let building = app_state
        .unit_service
        .update_building(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .audit_service
        .record(user.id, "Actualizar edificio", "buildings", Some(id.to_string()), &client)
        .await;

    Ok((StatusCode::OK, Json(building)))
}

#[utoipa::path(
    delete,
    path = "/api/buildings/{id}",
    tag = "Units",
    params(("id" = Uuid, Path, description = "ID do edifício")),
    responses(
        (status = 204, description = "Edifício removido"),
        (status = 409, description = "Edifício com unidades")
    ),
    security(("session_cookie" = []))
)]
pub async fn delete_building(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    client: ClientInfo,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .unit_service
        .delete_building(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .audit_service
        .record(user.id, "Eliminar edificio", "buildings", Some(id.to_string()), &client)
        .await;

    Ok(StatusCode::NO_CONTENT)
}

// ---
// Unidades
// ---

#[utoipa::path(
    get,
    path = "/api/units",
    tag = "Units",
    params(UnitFilter),
    responses((status = 200, body = Vec<UnitDetail>)),
    security(("session_cookie" = []))
)]
pub async fn list_units(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<UnitFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let units = app_state
        .unit_service
        .list_units(&filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(units)))
}

#[utoipa::path(
    get,
    path = "/api/units/{id}",
    tag = "Units",
    params(("id" = Uuid, Path, description = "ID da unidade")),
    responses((status = 200, body = UnitDetail), (status = 404, description = "Unidade não encontrada")),
    security(("session_cookie" = []))
)]
pub async fn get_unit(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let unit = app_state
        .unit_service
        .get_unit(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(unit)))
}

#[utoipa::path(
    post,
    path = "/api/units",
    tag = "Units",
    request_body = UnitPayload,
    responses(
        (status = 201, body = Unit),
        (status = 409, description = "Número já usado no edifício")
    ),
    security(("session_cookie" = []))
)]
pub async fn create_unit(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    client: ClientInfo,
    Json(payload): Json<UnitPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let unit = app_state
        .unit_service
        .create_unit(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .audit_service
        .record(user.id, "Crear unidad", "units", Some(unit.id.to_string()), &client)
        .await;

    Ok((StatusCode::CREATED, Json(unit)))
}

#[utoipa::path(
    put,
    path = "/api/units/{id}",
    tag = "Units",
    params(("id" = Uuid, Path, description = "ID da unidade")),
    request_body = UnitPayload,
    responses((status = 200, body = Unit), (status = 404, description = "Unidade não encontrada")),
    security(("session_cookie" = []))
)]
pub async fn update_unit(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    client: ClientInfo,
    Path(id): Path<Uuid>,
    Json(payload): Json<UnitPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let unit = app_state
        .unit_service
        .update_unit(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .audit_service
        .record(user.id, "Actualizar unidad", "units", Some(id.to_string()), &client)
        .await;

    Ok((StatusCode::OK, Json(unit)))
}

#[utoipa::path(
    delete,
    path = "/api/units/{id}",
    tag = "Units",
    params(("id" = Uuid, Path, description = "ID da unidade")),
    responses(
        (status = 204, description = "Unidade removida"),
        (status = 409, description = "Unidade com contrato ativo")
    ),
    security(("session_cookie" = []))
)]
pub async fn delete_unit(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    client: ClientInfo,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .unit_service
        .delete_unit(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .audit_service
        .record(user.id, "Eliminar unidad", "units", Some(id.to_string()), &client)
        .await;

    Ok(StatusCode::NO_CONTENT)
}

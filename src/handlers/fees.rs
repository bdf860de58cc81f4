// src/handlers/fees.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
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
        fee::{CategoryPayload, ExpenseCategory, Fee, FeeDetail, FeeFilter, FeeItemDetail, FeePayload, FeeWithItems},
    },
};

#[derive(Debug, Serialize, ToSchema)]
pub struct RefreshOverdueResponse {
    pub updated: u64,
}

// GET /api/fees
#[utoipa::path(
    get,
    path = "/api/fees",
    tag = "Fees",
    params(FeeFilter),
    responses((status = 200, body = Paginated<FeeDetail>)),
    security(("session_cookie" = []))
)]
pub async fn list_fees(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<FeeFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let fees = app_state
        .fee_service
        .list(&filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(fees)))
}

// GET /api/fees/{id}
#[utoipa::path(
    get,
    path = "/api/fees/{id}",
    tag = "Fees",
    params(("id" = Uuid, Path, description = "ID da expensa")),
    responses((status = 200, description = "Expensa com seus itens", body = FeeWithItems), (status = 404, description = "Registro não encontrado")),
    security(("session_cookie" = []))
)]
pub async fn get_fee(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let fee = app_state
        .fee_service
        .get(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(fee)))
}

// GET /api/fees/{id}/items
#[utoipa::path(
    get,
    path = "/api/fees/{id}/items",
    tag = "Fees",
    params(("id" = Uuid, Path, description = "ID da expensa")),
    responses((status = 200, body = Vec<FeeItemDetail>), (status = 404, description = "Registro não encontrado")),
    security(("session_cookie" = []))
)]
pub async fn list_fee_items(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let items = app_state
        .fee_service
        .items(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(items)))
}

// POST /api/fees
#[utoipa::path(
    post,
    path = "/api/fees",
    tag = "Fees",
    request_body = FeePayload,
    responses(
        (status = 201, body = Fee),
        (status = 409, description = "Já existe expensa para a unidade no período")
    ),
    security(("session_cookie" = []))
)]
pub async fn create_fee(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    client: ClientInfo,
    Json(payload): Json<FeePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let fee = app_state
        .fee_service
        .create(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .audit_service
        .record(user.id, "Crear expensa", "fees", Some(fee.id.to_string()), &client)
        .await;

    Ok((StatusCode::CREATED, Json(fee)))
}

// PUT /api/fees/{id}
#[utoipa::path(
    put,
    path = "/api/fees/{id}",
    tag = "Fees",
    params(("id" = Uuid, Path, description = "ID da expensa")),
    request_body = FeePayload,
    responses((status = 200, body = Fee), (status = 404, description = "Registro não encontrado"), (status = 409, description = "Conflito com dados existentes")),
    security(("session_cookie" = []))
)]
pub async fn update_fee(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    client: ClientInfo,
    Path(id): Path<Uuid>,
    Json(payload): Json<FeePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let fee = app_state
        .fee_service
        .update(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .audit_service
        .record(user.id, "Actualizar expensa", "fees", Some(id.to_string()), &client)
        .await;

    Ok((StatusCode::OK, Json(fee)))
}

// DELETE /api/fees/{id}
#[utoipa::path(
    delete,
    path = "/api/fees/{id}",
    tag = "Fees",
    params(("id" = Uuid, Path, description = "ID da expensa")),
    responses((status = 204, description = "Expensa e itens removidos"), (status = 404, description = "Registro não encontrado")),
    security(("session_cookie" = []))
)]
pub async fn delete_fee(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    client: ClientInfo,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .fee_service
        .delete(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .audit_service
        .record(user.id, "Eliminar expensa", "fees", Some(id.to_string()), &client)
        .await;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/fees/{id}/pay
#[utoipa::path(
    post,
    path = "/api/fees/{id}/pay",
    tag = "Fees",
    params(("id" = Uuid, Path, description = "ID da expensa")),
    responses((status = 200, description = "Expensa marcada como paga", body = Fee), (status = 404, description = "Registro não encontrado")),
    security(("session_cookie" = []))
)]
pub async fn mark_fee_paid(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    client: ClientInfo,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let fee = app_state
        .fee_service
        .mark_paid(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .audit_service
        .record(user.id, "Marcar expensa pagada", "fees", Some(id.to_string()), &client)
        .await;

    Ok((StatusCode::OK, Json(fee)))
}

// POST /api/fees/refresh-overdue
#[utoipa::path(
    post,
    path = "/api/fees/refresh-overdue",
    tag = "Fees",
    responses(
        (status = 200, description = "Quantidade de expensas que passaram a vencidas", body = RefreshOverdueResponse),
        (status = 403, description = "Apenas administradores")
    ),
    security(("session_cookie" = []))
)]
pub async fn refresh_overdue(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireAdmin,
) -> Result<impl IntoResponse, ApiError> {
    let updated = app_state
        .fee_service
        .refresh_overdue()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(RefreshOverdueResponse { updated })))
}

// GET /api/expense-categories
#[utoipa::path(
    get,
    path = "/api/expense-categories",
    tag = "Fees",
    responses((status = 200, body = Vec<ExpenseCategory>)),
    security(("session_cookie" = []))
)]
pub async fn list_categories(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let categories = app_state
        .fee_service
        .list_categories()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(categories)))
}

// POST /api/expense-categories
#[utoipa::path(
    post,
    path = "/api/expense-categories",
    tag = "Fees",
    request_body = CategoryPayload,
    responses((status = 201, body = ExpenseCategory), (status = 409, description = "Categoria já existe")),
    security(("session_cookie" = []))
)]
pub async fn create_category(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    client: ClientInfo,
    Json(payload): Json<CategoryPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let category = app_state
        .fee_service
        .create_category(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .audit_service
        .record(user.id, "Crear categoría", "expense_categories", Some(category.id.to_string()), &client)
        .await;

    Ok((StatusCode::CREATED, Json(category)))
}

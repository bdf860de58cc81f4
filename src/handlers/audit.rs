// src/handlers/audit.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::{error::ApiError, pagination::Paginated},
    config::AppState,
    middleware::{i18n::Locale, rbac::RequireAdmin},
    models::audit::{LogQuery, SecurityLog, SystemLog},
};

// GET /api/audit/security
#[utoipa::path(
    get,
    path = "/api/audit/security",
    tag = "Audit",
    params(LogQuery),
    responses((status = 200, description = "Eventos de autenticação, mais recentes primeiro", body = Paginated<SecurityLog>)),
    security(("session_cookie" = []))
)]
pub async fn security_logs(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireAdmin,
    Query(query): Query<LogQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let logs = app_state
        .audit_service
        .security_logs(&query)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(logs)))
}

// GET /api/audit/system
#[utoipa::path(
    get,
    path = "/api/audit/system",
    tag = "Audit",
    params(LogQuery),
    responses((status = 200, description = "Ações registradas pelos usuários", body = Paginated<SystemLog>)),
    security(("session_cookie" = []))
)]
pub async fn system_logs(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireAdmin,
    Query(query): Query<LogQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let logs = app_state
        .audit_service
        .system_logs(&query)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(logs)))
}

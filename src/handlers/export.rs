// src/handlers/export.rs

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale, rbac::RequireAdmin},
    models::{audit::ClientInfo, export::ExportQuery},
};

// GET /api/export
#[utoipa::path(
    get,
    path = "/api/export",
    tag = "Export",
    params(ExportQuery),
    responses(
        (status = 200, description = "Arquivo CSV ou JSON como anexo"),
        (status = 403, description = "Apenas administradores")
    ),
    security(("session_cookie" = []))
)]
pub async fn export_data(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireAdmin,
    AuthenticatedUser(user): AuthenticatedUser,
    client: ClientInfo,
    Query(query): Query<ExportQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let file = app_state
        .export_service
        .export(&query, user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .audit_service
        .record(user.id, &format!("Exportar {} ({} filas)", file.file_name, file.rows), "exports", None, &client)
        .await;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", file.file_name)),
        ],
        file.bytes,
    ))
}

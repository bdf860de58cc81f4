// src/handlers/backups.rs

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale, rbac::RequireAdmin},
    models::{
        audit::ClientInfo,
        backup::{BackupFile, CreateBackupPayload},
    },
};

// POST /api/backups
#[utoipa::path(
    post,
    path = "/api/backups",
    tag = "Backups",
    request_body = CreateBackupPayload,
    responses(
        (status = 201, description = "Backup gerado em BACKUP_DIR", body = BackupFile),
        (status = 403, description = "Apenas administradores")
    ),
    security(("session_cookie" = []))
)]
pub async fn create_backup(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireAdmin,
    AuthenticatedUser(user): AuthenticatedUser,
    client: ClientInfo,
    payload: Option<Json<CreateBackupPayload>>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();

    let backup = app_state
        .backup_service
        .create(payload.compress)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .audit_service
        .record(user.id, "Crear backup", "backups", Some(backup.name.clone()), &client)
        .await;

    Ok((StatusCode::CREATED, Json(backup)))
}

// GET /api/backups
#[utoipa::path(
    get,
    path = "/api/backups",
    tag = "Backups",
    responses((status = 200, description = "Backups do mais novo para o mais antigo", body = Vec<BackupFile>)),
    security(("session_cookie" = []))
)]
pub async fn list_backups(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireAdmin,
) -> Result<impl IntoResponse, ApiError> {
    let backups = app_state
        .backup_service
        .list()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(backups)))
}

// GET /api/backups/{name}
#[utoipa::path(
    get,
    path = "/api/backups/{name}",
    tag = "Backups",
    params(("name" = String, Path, description = "Nome do arquivo de backup")),
    responses(
        (status = 200, description = "Download do arquivo"),
        (status = 400, description = "Nome fora do padrão"),
        (status = 404, description = "Backup não encontrado")
    ),
    security(("session_cookie" = []))
)]
pub async fn download_backup(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireAdmin,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let bytes = app_state
        .backup_service
        .read(&name)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let content_type = if name.ends_with(".gz") { "application/gzip" } else { "application/sql" };

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", name)),
        ],
        bytes,
    ))
}

// DELETE /api/backups/{name}
#[utoipa::path(
    delete,
    path = "/api/backups/{name}",
    tag = "Backups",
    params(("name" = String, Path, description = "Nome do arquivo de backup")),
    responses(
        (status = 204, description = "Backup removido"),
        (status = 400, description = "Nome fora do padrão"),
        (status = 404, description = "Backup não encontrado")
    ),
    security(("session_cookie" = []))
)]
pub async fn delete_backup(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireAdmin,
    AuthenticatedUser(user): AuthenticatedUser,
    client: ClientInfo,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .backup_service
        .delete(&name)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .audit_service
        .record(user.id, "Eliminar backup", "backups", Some(name), &client)
        .await;

    Ok(StatusCode::NO_CONTENT)
}

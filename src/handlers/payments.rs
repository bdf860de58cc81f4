// src/handlers/payments.rs

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
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
        payment::{Payment, PaymentDetail, PaymentFilter, PaymentPayload},
    },
};

pub const RECEIPT_FIELD: &str = "comprobante";

// Arquivo recebido no multipart
struct Upload {
    file_name: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

async fn read_receipt_field(mut multipart: Multipart) -> Result<Upload, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::UploadTooLarge
        } else {
            tracing::warn!("Multipart inválido: {}", e);
            AppError::UploadMissing
        }
    })? {
        if field.name() != Some(RECEIPT_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| {
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                AppError::UploadTooLarge
            } else {
                AppError::UploadMissing
            }
        })?;
        return Ok(Upload { file_name, content_type, bytes: bytes.to_vec() });
    }
    Err(AppError::UploadMissing)
}

// GET /api/payments
#[utoipa::path(
    get,
    path = "/api/payments",
    tag = "Payments",
    params(PaymentFilter),
    responses((status = 200, body = Paginated<PaymentDetail>)),
    security(("session_cookie" = []))
)]
pub async fn list_payments(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<PaymentFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let payments = app_state
        .payment_service
        .list(&filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(payments)))
}

// GET /api/payments/{id}
#[utoipa::path(
    get,
    path = "/api/payments/{id}",
    tag = "Payments",
    params(("id" = Uuid, Path, description = "ID do pagamento")),
    responses((status = 200, body = PaymentDetail), (status = 404, description = "Registro não encontrado")),
    security(("session_cookie" = []))
)]
pub async fn get_payment(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let payment = app_state
        .payment_service
        .get(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(payment)))
}

// POST /api/payments
#[utoipa::path(
    post,
    path = "/api/payments",
    tag = "Payments",
    request_body = PaymentPayload,
    responses(
        (status = 201, description = "Pagamento registrado; expensa do período quitada quando cobre o total", body = Payment),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Apenas administradores"),
        (status = 422, description = "Contrato não pertence à unidade")
    ),
    security(("session_cookie" = []))
)]
pub async fn create_payment(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireAdmin,
    AuthenticatedUser(user): AuthenticatedUser,
    client: ClientInfo,
    Json(payload): Json<PaymentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let payment = app_state
        .payment_service
        .create(&payload, user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .audit_service
        .record(user.id, "Registrar pago", "payments", Some(payment.id.to_string()), &client)
        .await;

    Ok((StatusCode::CREATED, Json(payment)))
}

// PUT /api/payments/{id}
#[utoipa::path(
    put,
    path = "/api/payments/{id}",
    tag = "Payments",
    params(("id" = Uuid, Path, description = "ID do pagamento")),
    request_body = PaymentPayload,
    responses((status = 200, body = Payment), (status = 404, description = "Registro não encontrado"), (status = 403, description = "Apenas administradores")),
    security(("session_cookie" = []))
)]
pub async fn update_payment(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireAdmin,
    AuthenticatedUser(user): AuthenticatedUser,
    client: ClientInfo,
    Path(id): Path<Uuid>,
    Json(payload): Json<PaymentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let payment = app_state
        .payment_service
        .update(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .audit_service
        .record(user.id, "Actualizar pago", "payments", Some(id.to_string()), &client)
        .await;

    Ok((StatusCode::OK, Json(payment)))
}

// DELETE /api/payments/{id}
#[utoipa::path(
    delete,
    path = "/api/payments/{id}",
    tag = "Payments",
    params(("id" = Uuid, Path, description = "ID do pagamento")),
    responses((status = 204, description = "Pagamento e comprovante removidos"), (status = 404, description = "Registro não encontrado"), (status = 403, description = "Apenas administradores")),
    security(("session_cookie" = []))
)]
pub async fn delete_payment(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireAdmin,
    AuthenticatedUser(user): AuthenticatedUser,
    client: ClientInfo,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .payment_service
        .delete(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .audit_service
        .record(user.id, "Eliminar pago", "payments", Some(id.to_string()), &client)
        .await;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/payments/{id}/receipt
#[utoipa::path(
    post,
    path = "/api/payments/{id}/receipt",
    tag = "Payments",
    params(("id" = Uuid, Path, description = "ID do pagamento")),
    request_body(content_type = "multipart/form-data", description = "Campo `comprobante`: PDF, JPG ou PNG de até 5 MB"),
    responses(
        (status = 200, body = Payment),
        (status = 400, description = "Arquivo ausente"),
        (status = 413, description = "Arquivo maior que 5 MB"),
        (status = 415, description = "Extensão ou conteúdo não permitido")
    ),
    security(("session_cookie" = []))
)]
pub async fn upload_receipt(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireAdmin,
    AuthenticatedUser(user): AuthenticatedUser,
    client: ClientInfo,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let upload = read_receipt_field(multipart)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let payment = app_state
        .payment_service
        .attach_receipt(id, &upload.file_name, upload.content_type.as_deref(), &upload.bytes)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .audit_service
        .record(user.id, "Subir comprobante", "payments", Some(id.to_string()), &client)
        .await;

    Ok((StatusCode::OK, Json(payment)))
}

// GET /api/payments/{id}/receipt
#[utoipa::path(
    get,
    path = "/api/payments/{id}/receipt",
    tag = "Payments",
    params(("id" = Uuid, Path, description = "ID do pagamento")),
    responses(
        (status = 200, description = "Arquivo do comprovante"),
        (status = 404, description = "Pagamento sem comprovante")
    ),
    security(("session_cookie" = []))
)]
pub async fn download_receipt(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let (name, content_type, bytes) = app_state
        .payment_service
        .receipt(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, format!("inline; filename=\"{}\"", name)),
        ],
        bytes,
    ))
}

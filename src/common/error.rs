// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::{common::i18n::I18nStore, middleware::i18n::Locale};

// Erros de domínio e de infraestrutura. A mensagem do `#[error]` vai para o log;
// o que o cliente vê sai do catálogo de traduções (ver `to_api_error`).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // --- Autenticação e sessão ---
    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Muitas tentativas de login a partir do mesmo IP")]
    TooManyLoginAttempts,

    #[error("Sessão ausente")]
    SessionRequired,

    #[error("Sessão expirada por inatividade")]
    SessionExpired,

    #[error("Fingerprint da sessão não confere")]
    SessionFingerprintMismatch,

    #[error("Token CSRF inválido ou ausente")]
    CsrfTokenMismatch,

    #[error("Ação restrita a administradores")]
    AdminRequired,

    #[error("Um usuário não pode excluir a própria conta")]
    CannotDeleteSelf,

    // --- Recursos ---
    #[error("Recurso não encontrado: {0}")]
    NotFound(&'static str),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("DNI já existe")]
    DniAlreadyExists,

    #[error("Número de unidade já existe no edifício")]
    UnitNumberAlreadyExists,

    #[error("Categoria já existe")]
    CategoryAlreadyExists,

    #[error("Já existe expensa para a unidade no período")]
    FeePeriodAlreadyExists,

    #[error("Violação de restrição única: {0}")]
    UniqueConstraintViolation(String),

    #[error("Referência para registro inexistente")]
    InvalidReference,

    #[error("Registro em uso por outros dados")]
    RecordInUse,

    // --- Regras de negócio ---
    #[error("A unidade já possui contrato ativo")]
    UnitHasActiveLease,

    #[error("O inquilino possui contratos ativos")]
    TenantHasActiveLeases,

    #[error("O contrato não está ativo")]
    LeaseNotActive,

    #[error("O contrato não pertence à unidade informada")]
    LeaseUnitMismatch,

    #[error("A reparação não pode ser financiada com reserva")]
    RepairNotEligibleForReserve,

    #[error("A reserva não está disponível")]
    ReserveNotAvailable,

    #[error("Saldo da reserva insuficiente")]
    ReserveInsufficient,

    // --- Upload e arquivos ---
    #[error("Arquivo de comprovante ausente")]
    UploadMissing,

    #[error("Arquivo excede o tamanho máximo")]
    UploadTooLarge,

    #[error("Extensão de arquivo não permitida")]
    UploadExtensionNotAllowed,

    #[error("Tipo do arquivo não confere com a extensão")]
    UploadTypeMismatch,

    #[error("Nome de arquivo de backup inválido")]
    InvalidBackupName,

    // --- Infraestrutura ---
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de E/S: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Erro de CSV: {0}")]
    CsvError(#[from] csv::Error),
}

// Corpo de erro devolvido ao cliente
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}

impl AppError {
    /// Status HTTP e chave de tradução de cada variante.
    pub fn status_and_key(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, "error.validation"),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "error.invalid_credentials"),
            AppError::TooManyLoginAttempts => (StatusCode::TOO_MANY_REQUESTS, "error.too_many_attempts"),
            AppError::SessionRequired => (StatusCode::UNAUTHORIZED, "error.session_required"),
            AppError::SessionExpired => (StatusCode::UNAUTHORIZED, "error.session_expired"),
            AppError::SessionFingerprintMismatch => (StatusCode::UNAUTHORIZED, "error.session_invalid"),
            AppError::CsrfTokenMismatch => (StatusCode::FORBIDDEN, "error.csrf"),
            AppError::AdminRequired => (StatusCode::FORBIDDEN, "error.admin_required"),
            AppError::CannotDeleteSelf => (StatusCode::CONFLICT, "error.cannot_delete_self"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "error.not_found"),
            AppError::EmailAlreadyExists => (StatusCode::CONFLICT, "error.email_exists"),
            AppError::DniAlreadyExists => (StatusCode::CONFLICT, "error.dni_exists"),
            AppError::UnitNumberAlreadyExists => (StatusCode::CONFLICT, "error.unit_number_exists"),
            AppError::CategoryAlreadyExists => (StatusCode::CONFLICT, "error.category_exists"),
            AppError::FeePeriodAlreadyExists => (StatusCode::CONFLICT, "error.fee_period_exists"),
            AppError::UniqueConstraintViolation(_) => (StatusCode::CONFLICT, "error.duplicate"),
            AppError::InvalidReference => (StatusCode::UNPROCESSABLE_ENTITY, "error.invalid_reference"),
            AppError::RecordInUse => (StatusCode::CONFLICT, "error.record_in_use"),
            AppError::UnitHasActiveLease => (StatusCode::CONFLICT, "error.unit_has_active_lease"),
            AppError::TenantHasActiveLeases => (StatusCode::CONFLICT, "error.tenant_has_active_leases"),
            AppError::LeaseNotActive => (StatusCode::CONFLICT, "error.lease_not_active"),
            AppError::LeaseUnitMismatch => (StatusCode::UNPROCESSABLE_ENTITY, "error.lease_unit_mismatch"),
            AppError::RepairNotEligibleForReserve => (StatusCode::CONFLICT, "error.repair_not_eligible"),
            AppError::ReserveNotAvailable => (StatusCode::CONFLICT, "error.reserve_not_available"),
            AppError::ReserveInsufficient => (StatusCode::CONFLICT, "error.reserve_insufficient"),
            AppError::UploadMissing => (StatusCode::BAD_REQUEST, "error.upload_missing"),
            AppError::UploadTooLarge => (StatusCode::PAYLOAD_TOO_LARGE, "error.upload_too_large"),
            AppError::UploadExtensionNotAllowed => (StatusCode::UNSUPPORTED_MEDIA_TYPE, "error.upload_extension"),
            AppError::UploadTypeMismatch => (StatusCode::UNSUPPORTED_MEDIA_TYPE, "error.upload_type"),
            AppError::InvalidBackupName => (StatusCode::BAD_REQUEST, "error.invalid_backup_name"),
            AppError::DatabaseError(sqlx::Error::RowNotFound) => (StatusCode::NOT_FOUND, "error.not_found_generic"),
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::IoError(_)
            | AppError::CsvError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "error.internal"),
        }
    }

    /// Converte o erro numa resposta traduzida para o idioma do cliente.
    pub fn to_api_error(self, locale: &Locale, i18n: &I18nStore) -> ApiError {
        let lang = locale.0.as_str();
        let (status, key) = self.status_and_key();

        match self {
            AppError::ValidationError(errors) => {
                let mut details = Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<Value> = field_errors
                        .iter()
                        .map(|e| {
                            let message_key = e.message.as_deref().unwrap_or(e.code.as_ref());
                            Value::String(i18n.translate(lang, message_key))
                        })
                        .collect();
                    details.insert(field.to_string(), Value::Array(messages));
                }
                ApiError {
                    status,
                    error: i18n.translate(lang, key),
                    details: Some(Value::Object(details)),
                }
            }
            AppError::NotFound(entity) => {
                let entity_name = i18n.translate(lang, &format!("entity.{entity}"));
                ApiError {
                    status,
                    error: i18n.translate_with(lang, key, &[("entity", &entity_name)]),
                    details: None,
                }
            }
            other => {
                // O detalhe técnico fica só no log
                if status == StatusCode::INTERNAL_SERVER_ERROR {
                    tracing::error!("Erro Interno do Servidor: {}", other);
                }
                ApiError {
                    status,
                    error: i18n.translate(lang, key),
                    details: None,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::{ValidationError, ValidationErrors};

    fn store() -> I18nStore {
        I18nStore::load_embedded().expect("catálogos embutidos válidos")
    }

    #[test]
    fn test_validation_error_carries_translated_details() {
        let mut errors = ValidationErrors::new();
        let mut err = ValidationError::new("length");
        err.message = Some("validation.required".into());
        errors.add("dni", err);

        let api = AppError::ValidationError(errors).to_api_error(&Locale("es".into()), &store());

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.expect("deve ter detalhes");
        let dni = details["dni"].as_array().expect("lista de mensagens");
        assert_eq!(dni.len(), 1);
        assert_ne!(dni[0], "validation.required");
    }

    #[test]
    fn test_not_found_names_the_entity() {
        let api = AppError::NotFound("tenant").to_api_error(&Locale("en".into()), &store());
        assert_eq!(api.status, StatusCode::NOT_FOUND);
        assert!(api.error.to_lowercase().contains("tenant"));
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let api = AppError::InternalServerError(anyhow::anyhow!("senha do banco: hunter2"))
            .to_api_error(&Locale("es".into()), &store());
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.error.contains("hunter2"));
    }

    #[test]
    fn test_business_conflicts_map_to_409() {
        for err in [
            AppError::UnitHasActiveLease,
            AppError::FeePeriodAlreadyExists,
            AppError::ReserveInsufficient,
            AppError::TenantHasActiveLeases,
        ] {
            assert_eq!(err.status_and_key().0, StatusCode::CONFLICT);
        }
    }
}

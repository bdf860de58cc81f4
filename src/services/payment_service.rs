// src/services/payment_service.rs

use std::path::{Path, PathBuf};

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::{
        db_utils::period_of,
        error::AppError,
        pagination::{PageRequest, Paginated},
    },
    db::{FeeRepository, LeaseRepository, PaymentRepository},
    models::{
        fee::FeeStatus,
        payment::{NewPayment, Payment, PaymentDetail, PaymentFilter, PaymentPayload, PaymentType},
    },
};

pub const MAX_RECEIPT_BYTES: usize = 5 * 1024 * 1024;

// Extensão, content-types aceitos e assinatura (magic bytes)
const RECEIPT_KINDS: &[(&str, &[&str], &[u8])] = &[
    ("pdf", &["application/pdf"], b"%PDF"),
    ("jpg", &["image/jpeg", "image/jpg", "image/pjpeg"], &[0xFF, 0xD8, 0xFF]),
    ("jpeg", &["image/jpeg", "image/jpg", "image/pjpeg"], &[0xFF, 0xD8, 0xFF]),
    ("png", &["image/png"], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]),
];

/// Valida um comprovante enviado e devolve a extensão normalizada.
pub fn validate_receipt(file_name: &str, content_type: Option<&str>, bytes: &[u8]) -> Result<&'static str, AppError> {
    if bytes.is_empty() {
        return Err(AppError::UploadMissing);
    }
    if bytes.len() > MAX_RECEIPT_BYTES {
        return Err(AppError::UploadTooLarge);
    }

    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .ok_or(AppError::UploadExtensionNotAllowed)?;
    let (ext, mime_types, magic) = RECEIPT_KINDS
        .iter()
        .find(|(ext, _, _)| *ext == extension)
        .ok_or(AppError::UploadExtensionNotAllowed)?;

    let declared = content_type
        .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase())
        .ok_or(AppError::UploadTypeMismatch)?;
    if !mime_types.contains(&declared.as_str()) || !bytes.starts_with(magic) {
        return Err(AppError::UploadTypeMismatch);
    }

    Ok(*ext)
}

/// Nome aleatório para o arquivo salvo em disco.
pub fn receipt_file_name(extension: &str) -> String {
    format!(
        "comprobante_{}_{}.{}",
        Utc::now().format("%Y%m%d%H%M%S"),
        hex::encode(rand::random::<[u8; 8]>()),
        extension
    )
}

pub fn content_type_for(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("pdf") => "application/pdf",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        _ => "application/octet-stream",
    }
}

/// Um pagamento de expensa quita a expensa se cobre o total.
pub fn settles_fee(payment_amount: Decimal, fee_total: Decimal) -> bool {
    payment_amount >= fee_total
}

#[derive(Clone)]
pub struct PaymentService {
    pool: PgPool,
    payment_repo: PaymentRepository,
    fee_repo: FeeRepository,
    lease_repo: LeaseRepository,
    upload_dir: PathBuf,
}

impl PaymentService {
    pub fn new(
        pool: PgPool,
        payment_repo: PaymentRepository,
        fee_repo: FeeRepository,
        lease_repo: LeaseRepository,
        upload_dir: PathBuf,
    ) -> Self {
        Self { pool, payment_repo, fee_repo, lease_repo, upload_dir }
    }

    pub async fn list(&self, filter: &PaymentFilter) -> Result<Paginated<PaymentDetail>, AppError> {
        let page = PageRequest::new(filter.page, filter.per_page);
        let (payments, total) = self.payment_repo.list(filter, page).await?;
        Ok(Paginated::new(payments, total, page))
    }

    pub async fn get(&self, id: Uuid) -> Result<PaymentDetail, AppError> {
        self.payment_repo.find(id).await?.ok_or(AppError::NotFound("payment"))
    }

    // O contrato informado precisa ser da unidade do pagamento
    async fn check_lease(&self, conn: &mut PgConnection, new: &NewPayment) -> Result<(), AppError> {
        if let Some(lease_id) = new.lease_id {
            let lease = self
                .lease_repo
                .find_for_update(&mut *conn, lease_id)
                .await?
                .ok_or(AppError::NotFound("lease"))?;
            if Some(lease.unit_id) != new.unit_id {
                return Err(AppError::LeaseUnitMismatch);
            }
        }
        Ok(())
    }

    pub async fn create(&self, payload: &PaymentPayload, created_by: Uuid) -> Result<Payment, AppError> {
        payload.validate_consistency()?;
        let new = NewPayment::from_payload(payload, Some(created_by));

        let mut tx = self.pool.begin().await?;

        self.check_lease(&mut *tx, &new).await?;
        let payment = self.payment_repo.create(&mut *tx, &new).await?;

        // Expensa do mês do pagamento
        if let (PaymentType::Expensa, Some(unit_id)) = (payment.payment_type, payment.unit_id) {
            let (year, month) = period_of(payment.payment_date);
            if let Some(fee) = self
                .fee_repo
                .find_open_for_period(&mut *tx, unit_id, year, month as i32)
                .await?
            {
                if settles_fee(payment.amount, fee.total_amount) {
                    self.fee_repo.set_status(&mut *tx, fee.id, FeeStatus::Pagada).await?;
                    tracing::info!("💰 Expensa {} quitada pelo pagamento {}", fee.id, payment.id);
                }
            }
        }

        tx.commit().await?;
        Ok(payment)
    }

    pub async fn update(&self, id: Uuid, payload: &PaymentPayload) -> Result<Payment, AppError> {
        payload.validate_consistency()?;
        let current = self.get(id).await?;
        let new = NewPayment::from_payload(payload, current.payment.created_by);

        let mut tx = self.pool.begin().await?;

        self.check_lease(&mut *tx, &new).await?;
        let payment = self
            .payment_repo
            .update(&mut *tx, id, &new)
            .await?
            .ok_or(AppError::NotFound("payment"))?;

        tx.commit().await?;
        Ok(payment)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let payment = self
            .payment_repo
            .delete(id)
            .await?
            .ok_or(AppError::NotFound("payment"))?;
        if let Some(receipt) = payment.receipt {
            self.remove_file(&receipt).await;
        }
        Ok(())
    }

    /// Grava o comprovante em disco e associa ao pagamento.
    pub async fn attach_receipt(
        &self,
        id: Uuid,
        file_name: &str,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<Payment, AppError> {
        let current = self.get(id).await?;
        let extension = validate_receipt(file_name, content_type, bytes)?;

        tokio::fs::create_dir_all(&self.upload_dir).await?;
        let stored_name = receipt_file_name(extension);
        tokio::fs::write(self.upload_dir.join(&stored_name), bytes).await?;

        let payment = match self.payment_repo.set_receipt(id, &stored_name).await {
            Ok(Some(payment)) => payment,
            Ok(None) => {
                self.remove_file(&stored_name).await;
                return Err(AppError::NotFound("payment"));
            }
            Err(e) => {
                self.remove_file(&stored_name).await;
                return Err(e);
            }
        };

        if let Some(previous) = current.payment.receipt {
            self.remove_file(&previous).await;
        }
        Ok(payment)
    }

    /// Conteúdo do comprovante: (nome, content-type, bytes).
    pub async fn receipt(&self, id: Uuid) -> Result<(String, &'static str, Vec<u8>), AppError> {
        let payment = self.get(id).await?;
        let name = payment.payment.receipt.ok_or(AppError::NotFound("receipt"))?;
        let bytes = match tokio::fs::read(self.upload_dir.join(&name)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(AppError::NotFound("receipt")),
            Err(e) => return Err(e.into()),
        };
        let content_type = content_type_for(&name);
        Ok((name, content_type, bytes))
    }

    async fn remove_file(&self, name: &str) {
        if let Err(e) = tokio::fs::remove_file(self.upload_dir.join(name)).await {
            tracing::warn!("Não foi possível remover o comprovante {}: {}", name, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    const PDF: &[u8] = b"%PDF-1.7 conteudo";
    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];
    const JPG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0];

    #[rstest]
    #[case("recibo.pdf", "application/pdf", PDF, "pdf")]
    #[case("foto.JPG", "image/jpeg", JPG, "jpg")]
    #[case("foto.jpeg", "image/jpeg", JPG, "jpeg")]
    #[case("captura.png", "image/png", PNG, "png")]
    fn test_accepts_valid_receipts(
        #[case] name: &str,
        #[case] content_type: &str,
        #[case] bytes: &[u8],
        #[case] expected: &str,
    ) {
        assert_eq!(validate_receipt(name, Some(content_type), bytes).unwrap(), expected);
    }

    #[test]
    fn test_rejects_disallowed_extension() {
        assert!(matches!(
            validate_receipt("script.php", Some("application/pdf"), PDF),
            Err(AppError::UploadExtensionNotAllowed)
        ));
        assert!(matches!(
            validate_receipt("sem_extensao", Some("application/pdf"), PDF),
            Err(AppError::UploadExtensionNotAllowed)
        ));
    }

    #[test]
    fn test_rejects_content_type_or_signature_mismatch() {
        assert!(matches!(
            validate_receipt("recibo.pdf", Some("image/png"), PDF),
            Err(AppError::UploadTypeMismatch)
        ));
        // Extensão e content-type corretos, conteúdo de outro tipo
        assert!(matches!(
            validate_receipt("recibo.pdf", Some("application/pdf"), PNG),
            Err(AppError::UploadTypeMismatch)
        ));
        assert!(matches!(
            validate_receipt("recibo.pdf", None, PDF),
            Err(AppError::UploadTypeMismatch)
        ));
    }

    #[test]
    fn test_rejects_empty_and_oversized_files() {
        assert!(matches!(
            validate_receipt("recibo.pdf", Some("application/pdf"), &[]),
            Err(AppError::UploadMissing)
        ));
        let mut big = PDF.to_vec();
        big.resize(MAX_RECEIPT_BYTES + 1, 0);
        assert!(matches!(
            validate_receipt("recibo.pdf", Some("application/pdf"), &big),
            Err(AppError::UploadTooLarge)
        ));
    }

    #[test]
    fn test_receipt_file_names_are_random() {
        let a = receipt_file_name("pdf");
        let b = receipt_file_name("pdf");
        assert!(a.starts_with("comprobante_") && a.ends_with(".pdf"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_fee_settlement_threshold() {
        assert!(settles_fee(dec!(500), dec!(500)));
        assert!(settles_fee(dec!(600), dec!(500)));
        assert!(!settles_fee(dec!(499.99), dec!(500)));
    }
}

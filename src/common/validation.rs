// src/common/validation.rs

// ====================================================================================
// VALIDADORES CUSTOMIZADOS (usados via #[validate(custom(function = "..."))])
// As mensagens são chaves do catálogo de traduções.
// ====================================================================================

use std::borrow::Cow;

use rust_decimal::Decimal;
use validator::ValidationError;

fn error(code: &'static str, message_key: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message_key));
    err
}

pub fn validate_positive(val: &Decimal) -> Result<(), ValidationError> {
    if *val <= Decimal::ZERO {
        return Err(error("range", "validation.positive"));
    }
    Ok(())
}

pub fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() && !val.is_zero() {
        return Err(error("range", "validation.not_negative"));
    }
    Ok(())
}

/// DNI argentino: 7 ou 8 dígitos, sem pontos.
pub fn validate_dni(dni: &str) -> Result<(), ValidationError> {
    let ok = (7..=8).contains(&dni.len()) && dni.bytes().all(|b| b.is_ascii_digit());
    if !ok {
        return Err(error("dni", "validation.dni"));
    }
    Ok(())
}

/// Mantém apenas dígitos e '+'.
pub fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit() || *c == '+').collect()
}

// Internacional (+...) exige ao menos 10 caracteres; local entre 8 e 12.
pub fn validate_phone(raw: &str) -> Result<(), ValidationError> {
    let phone = normalize_phone(raw);
    let len = phone.len();
    let ok = if phone.starts_with('+') {
        len >= 10 && phone[1..].bytes().all(|b| b.is_ascii_digit())
    } else {
        (8..=12).contains(&len)
    };
    if !ok {
        return Err(error("phone", "validation.phone"));
    }
    Ok(())
}

pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let strong = password.chars().count() >= 8
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| !c.is_ascii_alphanumeric());
    if !strong {
        return Err(error("password", "validation.password_weak"));
    }
    Ok(())
}

pub fn validate_not_blank(val: &str) -> Result<(), ValidationError> {
    if val.trim().is_empty() {
        return Err(error("required", "validation.required"));
    }
    Ok(())
}

/// Agrega um erro manual ao formato padrão do `validator`.
pub fn field_error(field: &'static str, code: &'static str, message_key: &'static str) -> validator::ValidationErrors {
    let mut errors = validator::ValidationErrors::new();
    errors.add(field, error(code, message_key));
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case("1234567", true)]
    #[case("12345678", true)]
    #[case("123456", false)]
    #[case("123456789", false)]
    #[case("12.345.678", false)]
    #[case("1234567a", false)]
    fn test_dni(#[case] dni: &str, #[case] valid: bool) {
        assert_eq!(validate_dni(dni).is_ok(), valid);
    }

    #[rstest]
    #[case("11 4567-8901", true)]
    #[case("4567-8901", true)]
    #[case("4567-890", false)]
    #[case("1234567", false)]
    #[case("1234567890123", false)]
    #[case("+54 9 11 4567 8901", true)]
    #[case("+54 11 23", false)]
    fn test_phone(#[case] phone: &str, #[case] valid: bool) {
        assert_eq!(validate_phone(phone).is_ok(), valid);
    }

    #[test]
    fn test_normalize_phone_keeps_digits_and_plus() {
        assert_eq!(normalize_phone("+54 (11) 4567-8901"), "+541145678901");
    }

    #[rstest]
    #[case("Segura#2024", true)]
    #[case("segura#2024", false)]
    #[case("SEGURA#2024", false)]
    #[case("Segura2024", false)]
    #[case("Seg#20", false)]
    fn test_password_strength(#[case] password: &str, #[case] valid: bool) {
        assert_eq!(validate_password_strength(password).is_ok(), valid);
    }

    #[test]
    fn test_amount_validators() {
        assert!(validate_positive(&dec!(0.01)).is_ok());
        assert!(validate_positive(&Decimal::ZERO).is_err());
        assert!(validate_positive(&dec!(-5)).is_err());
        assert!(validate_not_negative(&Decimal::ZERO).is_ok());
        assert!(validate_not_negative(&dec!(-0.01)).is_err());
    }

    #[test]
    fn test_field_error_uses_message_key() {
        let errors = field_error("leaseId", "required", "validation.lease_required");
        let field_errors = errors.field_errors();
        let field = field_errors["leaseId"];
        assert_eq!(field[0].message.as_deref(), Some("validation.lease_required"));
    }
}

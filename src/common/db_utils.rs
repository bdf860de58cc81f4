// src/common/db_utils.rs

use chrono::{Datelike, NaiveDate};

use crate::common::error::AppError;

// ---
// Tradução de erros do Postgres para erros de domínio
// ---

/// Converte violações de unicidade usando o nome da constraint; FKs inválidas
/// viram `InvalidReference`.
pub(crate) fn map_write_error(
    e: sqlx::Error,
    by_constraint: impl Fn(&str) -> Option<AppError>,
) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            if let Some(constraint) = db_err.constraint() {
                return by_constraint(constraint)
                    .unwrap_or_else(|| AppError::UniqueConstraintViolation(constraint.to_string()));
            }
        }
        if db_err.is_foreign_key_violation() {
            return AppError::InvalidReference;
        }
    }
    e.into()
}

/// Em DELETE, uma FK violada significa que outro registro ainda aponta para este.
pub(crate) fn map_delete_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_foreign_key_violation() {
            return AppError::RecordInUse;
        }
    }
    e.into()
}

// ---
// Períodos (ano/mês)
// ---

/// Primeiro e último dia do mês. `None` para mês ou ano inválido.
pub fn period_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next.pred_opt()?))
}

/// Período (ano, mês) de uma data.
pub fn period_of(date: NaiveDate) -> (i32, u32) {
    (date.year(), date.month())
}

/// Escapa os curingas do ILIKE e envolve o termo em '%'.
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term.trim().replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    format!("%{}%", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_bounds() {
        let (first, last) = period_bounds(2024, 2).unwrap();
        assert_eq!(first, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(last, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());

        let (_, last) = period_bounds(2023, 12).unwrap();
        assert_eq!(last, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());

        assert!(period_bounds(2024, 13).is_none());
        assert!(period_bounds(2024, 0).is_none());
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(" 50%_off "), "%50\\%\\_off%");
    }

    #[test]
    fn test_non_database_errors_pass_through() {
        let err = map_write_error(sqlx::Error::RowNotFound, |_| None);
        assert!(matches!(err, AppError::DatabaseError(sqlx::Error::RowNotFound)));
        let err = map_delete_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::DatabaseError(sqlx::Error::RowNotFound)));
    }
}

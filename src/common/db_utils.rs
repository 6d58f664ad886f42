// src/common/db_utils.rs

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};

// ---
// Helpers compartilhados pelos repositórios
// ---

/// `true` quando o erro do Postgres é violação de UNIQUE.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

/// `true` quando o erro do Postgres é violação de FOREIGN KEY.
pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation())
}

/// Intervalo [início, fim) de um mês do calendário em UTC.
pub fn month_bounds(year: i32, month: u32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((
        Utc.from_utc_datetime(&start.and_hms_opt(0, 0, 0)?),
        Utc.from_utc_datetime(&next.and_hms_opt(0, 0, 0)?),
    ))
}

/// (mês, ano) de um instante em UTC.
pub fn period_of(instant: DateTime<Utc>) -> (i32, i32) {
    (instant.month() as i32, instant.year())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_bounds_roll_over_december() {
        let (start, end) = month_bounds(2025, 12).unwrap();
        assert_eq!(start.to_rfc3339(), "2025-12-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2026-01-01T00:00:00+00:00");
    }

    #[test]
    fn month_bounds_reject_invalid_month() {
        assert!(month_bounds(2025, 13).is_none());
        assert!(month_bounds(2025, 0).is_none());
    }

    #[test]
    fn period_uses_utc_calendar() {
        let instant = Utc.with_ymd_and_hms(2025, 3, 31, 23, 59, 59).unwrap();
        assert_eq!(period_of(instant), (3, 2025));
    }
}

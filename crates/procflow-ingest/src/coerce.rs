//! Strict cell coercion.
//!
//! Each function turns one loosely typed [`Cell`] into the value a column role
//! needs, or reports an [`IssueKind`]. Nothing here defaults a bad value.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::IssueKind;
use crate::table::Cell;

/// Largest integer magnitude an `f64` carries exactly.
const MAX_EXACT_F64_INT: f64 = 9_007_199_254_740_992.0;

pub fn coerce_case_id(cell: &Cell) -> Result<i64, IssueKind> {
    match cell {
        Cell::Null => Err(IssueKind::MissingValue),
        Cell::Bool(_) => Err(IssueKind::NonNumericCaseId),
        Cell::Number(n) => number_to_case_id(*n),
        Cell::Text(s) => {
            let t = s.trim();
            if t.is_empty() {
                return Err(IssueKind::MissingValue);
            }
            if let Ok(v) = t.parse::<i64>() {
                return Ok(v);
            }
            match t.parse::<f64>() {
                Ok(n) => number_to_case_id(n),
                Err(_) => Err(IssueKind::NonNumericCaseId),
            }
        }
    }
}

fn number_to_case_id(n: f64) -> Result<i64, IssueKind> {
    if !n.is_finite() {
        return Err(IssueKind::NonNumericCaseId);
    }
    if n.fract() != 0.0 || n.abs() > MAX_EXACT_F64_INT {
        return Err(IssueKind::NonIntegralCaseId);
    }
    Ok(n as i64)
}

/// Activity label. `None` for a missing cell; empty text counts as missing.
pub fn coerce_label(cell: &Cell) -> Option<String> {
    match cell {
        Cell::Null => None,
        Cell::Text(s) if s.is_empty() => None,
        other => Some(other.to_string()),
    }
}

/// Happy-path flag: only boolean `true` or the exact text `"true"` count.
pub fn coerce_flag(cell: &Cell) -> bool {
    match cell {
        Cell::Bool(b) => *b,
        Cell::Text(s) => s == "true",
        _ => false,
    }
}

/// Duration sample. Missing cells are `Ok(None)`; unparsable ones are issues.
pub fn coerce_duration(cell: &Cell) -> Result<Option<f64>, IssueKind> {
    match cell {
        Cell::Null => Ok(None),
        Cell::Number(n) if n.is_finite() => Ok(Some(*n)),
        Cell::Number(_) | Cell::Bool(_) => Err(IssueKind::NonNumericDuration),
        Cell::Text(s) => {
            let t = s.trim();
            if t.is_empty() {
                return Ok(None);
            }
            match t.parse::<f64>() {
                Ok(n) if n.is_finite() => Ok(Some(n)),
                _ => Err(IssueKind::NonNumericDuration),
            }
        }
    }
}

/// Event timestamp.
///
/// Accepts RFC 3339 text, `YYYY-MM-DD HH:MM:SS[.fff]` or `YYYY-MM-DDTHH:MM:SS[.fff]`
/// (read as UTC), a bare `YYYY-MM-DD` date, or a number of epoch milliseconds.
pub fn coerce_timestamp(cell: &Cell) -> Result<DateTime<Utc>, IssueKind> {
    match cell {
        Cell::Null => Err(IssueKind::MissingValue),
        Cell::Bool(_) => Err(IssueKind::UnparsableTimestamp),
        Cell::Number(n) => {
            if !n.is_finite() || n.fract() != 0.0 {
                return Err(IssueKind::UnparsableTimestamp);
            }
            Utc.timestamp_millis_opt(*n as i64)
                .single()
                .ok_or(IssueKind::UnparsableTimestamp)
        }
        Cell::Text(s) => {
            let t = s.trim();
            if t.is_empty() {
                return Err(IssueKind::MissingValue);
            }
            parse_timestamp_text(t).ok_or(IssueKind::UnparsableTimestamp)
        }
    }
}

fn parse_timestamp_text(t: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(t) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(t, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(t, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn case_id_accepts_integers_only() {
        assert_eq!(coerce_case_id(&Cell::Number(7.0)), Ok(7));
        assert_eq!(coerce_case_id(&Cell::text(" 42 ")), Ok(42));
        assert_eq!(coerce_case_id(&Cell::text("3.0")), Ok(3));
        assert_eq!(coerce_case_id(&Cell::Number(1.5)), Err(IssueKind::NonIntegralCaseId));
        assert_eq!(coerce_case_id(&Cell::text("abc")), Err(IssueKind::NonNumericCaseId));
        assert_eq!(coerce_case_id(&Cell::Number(f64::NAN)), Err(IssueKind::NonNumericCaseId));
        assert_eq!(coerce_case_id(&Cell::Null), Err(IssueKind::MissingValue));
        assert_eq!(coerce_case_id(&Cell::text("")), Err(IssueKind::MissingValue));
    }

    #[test]
    fn flag_is_an_exact_string_match() {
        assert!(coerce_flag(&Cell::text("true")));
        assert!(coerce_flag(&Cell::Bool(true)));
        assert!(!coerce_flag(&Cell::text("True")));
        assert!(!coerce_flag(&Cell::text("yes")));
        assert!(!coerce_flag(&Cell::text("false")));
        assert!(!coerce_flag(&Cell::Number(1.0)));
        assert!(!coerce_flag(&Cell::Null));
    }

    #[test]
    fn labels_keep_text_and_render_scalars() {
        assert_eq!(coerce_label(&Cell::text("Ship")), Some("Ship".to_string()));
        assert_eq!(coerce_label(&Cell::Number(3.0)), Some("3".to_string()));
        assert_eq!(coerce_label(&Cell::text("")), None);
        assert_eq!(coerce_label(&Cell::Null), None);
    }

    #[test]
    fn duration_coercion() {
        assert_eq!(coerce_duration(&Cell::Null), Ok(None));
        assert_eq!(coerce_duration(&Cell::text("  ")), Ok(None));
        let parsed = coerce_duration(&Cell::text("2.5")).unwrap().unwrap();
        assert_relative_eq!(parsed, 2.5);
        assert_eq!(coerce_duration(&Cell::text("n/a")), Err(IssueKind::NonNumericDuration));
        assert_eq!(coerce_duration(&Cell::text("NaN")), Err(IssueKind::NonNumericDuration));
        assert_eq!(coerce_duration(&Cell::Number(f64::NAN)), Err(IssueKind::NonNumericDuration));
    }

    #[test]
    fn timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap();
        assert_eq!(coerce_timestamp(&Cell::text("2024-03-01T08:30:00Z")), Ok(expected));
        assert_eq!(coerce_timestamp(&Cell::text("2024-03-01T09:30:00+01:00")), Ok(expected));
        assert_eq!(coerce_timestamp(&Cell::text("2024-03-01 08:30:00")), Ok(expected));
        assert_eq!(
            coerce_timestamp(&Cell::Number(expected.timestamp_millis() as f64)),
            Ok(expected)
        );
        assert_eq!(
            coerce_timestamp(&Cell::text("2024-03-01")),
            Ok(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(
            coerce_timestamp(&Cell::text("yesterday")),
            Err(IssueKind::UnparsableTimestamp)
        );
    }
}

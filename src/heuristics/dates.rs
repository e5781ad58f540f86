use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::io::CellValue;

/// Display format for dates, e.g. 13-Aug-25
pub const DEFAULT_DATE_FORMAT: &str = "%d-%b-%y";

const MIDNIGHT_SUFFIX: &str = " 00:00:00";

/// Reformat a date-looking string; `None` when it is not one.
///
/// Two shapes are recognised:
/// - `YYYY-MM-DD 00:00:00` (a date that went through a timestamp)
/// - any 10-character string containing a hyphen, parsed as `YYYY-MM-DD`
pub fn normalize_date_text(value: &str, format: &str) -> Option<String> {
    if value.is_empty() || value == "nan" {
        return None;
    }

    let parsed = if value.contains(MIDNIGHT_SUFFIX) {
        NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date())
    } else if value.chars().count() == 10 && value.contains('-') {
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
    } else {
        return None;
    };

    match parsed {
        Ok(date) => Some(date.format(format).to_string()),
        Err(e) => {
            debug!("Keeping '{}' as text: {}", value, e);
            None
        }
    }
}

/// Render a Variables-sheet value as the text substituted into the document.
///
/// Native dates are formatted directly; text goes through
/// [`normalize_date_text`] and is kept unchanged when that fails.
pub fn normalize_variable(value: &CellValue, format: &str) -> String {
    match value {
        CellValue::DateTime(dt) => dt.format(format).to_string(),
        CellValue::Text(s) => normalize_date_text(s, format).unwrap_or_else(|| s.clone()),
        other => other.as_text().unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso_date_string() {
        assert_eq!(
            normalize_date_text("2025-08-13", DEFAULT_DATE_FORMAT).as_deref(),
            Some("13-Aug-25")
        );
        assert_eq!(
            normalize_date_text("2024-02-29", DEFAULT_DATE_FORMAT).as_deref(),
            Some("29-Feb-24")
        );
    }

    #[test]
    fn test_midnight_timestamp_string() {
        assert_eq!(
            normalize_date_text("2025-08-13 00:00:00", DEFAULT_DATE_FORMAT).as_deref(),
            Some("13-Aug-25")
        );
    }

    #[test]
    fn test_non_dates_are_left_alone() {
        assert_eq!(normalize_date_text("Acme Co", DEFAULT_DATE_FORMAT), None);
        assert_eq!(normalize_date_text("2025-08-13 14:30:00", DEFAULT_DATE_FORMAT), None);
        // Ten characters with a hyphen, but not a date
        assert_eq!(normalize_date_text("ABC-DEF-GH", DEFAULT_DATE_FORMAT), None);
        assert_eq!(normalize_date_text("2025-13-45", DEFAULT_DATE_FORMAT), None);
        assert_eq!(normalize_date_text("nan", DEFAULT_DATE_FORMAT), None);
    }

    #[test]
    fn test_normalize_variable() {
        let dt = NaiveDate::from_ymd_opt(2025, 8, 13)
            .unwrap()
            .and_hms_opt(15, 0, 0)
            .unwrap();
        assert_eq!(normalize_variable(&CellValue::DateTime(dt), DEFAULT_DATE_FORMAT), "13-Aug-25");
        assert_eq!(
            normalize_variable(&CellValue::Text("ABC-DEF-GH".into()), DEFAULT_DATE_FORMAT),
            "ABC-DEF-GH"
        );
        assert_eq!(normalize_variable(&CellValue::Number(12.0), DEFAULT_DATE_FORMAT), "12");
        assert_eq!(normalize_variable(&CellValue::Empty, DEFAULT_DATE_FORMAT), "");
    }
}

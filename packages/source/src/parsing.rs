//! Cell-level parsing for accident tables.
//!
//! Every function here is total: malformed input degrades to `None`
//! rather than an error, so one bad row never aborts a run.

use chrono::NaiveDate;

/// Parses an accident date with the dataset's `chrono` format string.
///
/// Returns `None` for blank cells and for any value that does not match
/// the format exactly (including trailing time components).
#[must_use]
pub fn parse_accident_date(s: &str, format: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(s, format).ok()
}

/// Renders a parsed date as ISO 8601 (`YYYY-MM-DD`), or an empty string.
#[must_use]
pub fn format_iso_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Parses a non-negative count. Accepts integral float spellings such as
/// `"2.0"`.
#[must_use]
pub fn parse_count(s: &str) -> Option<u64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(n) = s.parse::<u64>() {
        return Some(n);
    }
    let (int_part, frac_part) = s.split_once('.')?;
    if frac_part.bytes().all(|b| b == b'0') {
        int_part.parse::<u64>().ok()
    } else {
        None
    }
}

/// Parses a derived month or year cell written by the preparation stage.
#[must_use]
pub fn parse_period<T: std::str::FromStr>(s: &str) -> Option<T> {
    let s = s.trim();
    let s = s.strip_suffix(".0").unwrap_or(s);
    if s.is_empty() { None } else { s.parse().ok() }
}

/// Returns the trimmed cell as an owned string, or `None` when blank.
#[must_use]
pub fn non_blank(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORMAT: &str = "%d/%m/%Y";

    #[test]
    fn parses_day_month_year() {
        let date = parse_accident_date("17/05/2022", FORMAT).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2022, 5, 17).unwrap());
    }

    #[test]
    fn rejects_other_date_shapes() {
        assert!(parse_accident_date("2022-05-17", FORMAT).is_none());
        assert!(parse_accident_date("31/02/2022", FORMAT).is_none());
        assert!(parse_accident_date("17/05/2022 10:00", FORMAT).is_none());
        assert!(parse_accident_date("not-a-date", FORMAT).is_none());
        assert!(parse_accident_date("   ", FORMAT).is_none());
    }

    #[test]
    fn formats_iso_dates() {
        assert_eq!(
            format_iso_date(NaiveDate::from_ymd_opt(2022, 1, 3)),
            "2022-01-03"
        );
        assert_eq!(format_iso_date(None), "");
    }

    #[test]
    fn parses_counts() {
        assert_eq!(parse_count("3"), Some(3));
        assert_eq!(parse_count(" 0 "), Some(0));
        assert_eq!(parse_count("2.0"), Some(2));
        assert_eq!(parse_count("2.5"), None);
        assert_eq!(parse_count("-1"), None);
        assert_eq!(parse_count(""), None);
    }

    #[test]
    fn parses_periods() {
        assert_eq!(parse_period::<u32>("5"), Some(5));
        assert_eq!(parse_period::<i32>("2022.0"), Some(2022));
        assert_eq!(parse_period::<u32>(""), None);
    }

    #[test]
    fn blank_cells_are_none() {
        assert_eq!(non_blank("  Chuva "), Some("Chuva".to_string()));
        assert_eq!(non_blank(""), None);
    }
}

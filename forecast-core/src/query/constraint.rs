//! Range checks and date parsing shared by the validator and descriptor registration

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};

use super::error::QueryError;

/// An accepted date layout
#[derive(Debug, Clone, Copy)]
pub struct DateFormat {
    /// Layout as shown to API callers
    pub display: &'static str,
    /// chrono layout used for parsing
    pub pattern: &'static str,
    /// Whether the layout carries a time of day
    pub has_time: bool,
}

const fn date(display: &'static str, pattern: &'static str) -> DateFormat {
    DateFormat {
        display,
        pattern,
        has_time: false,
    }
}

const fn date_time(display: &'static str, pattern: &'static str) -> DateFormat {
    DateFormat {
        display,
        pattern,
        has_time: true,
    }
}

/// Accepted date layouts, tried in order; the first that parses wins
pub const DATE_FORMATS: [DateFormat; 14] = [
    date("dd/MM/yyyy", "%d/%m/%Y"),
    date("dd-MM-yyyy", "%d-%m-%Y"),
    date("MM-dd-yyyy", "%m-%d-%Y"),
    date("MM/dd/yyy", "%m/%d/%Y"),
    date("yyyy/MM/dd", "%Y/%m/%d"),
    date("yyyy-MM-dd", "%Y-%m-%d"),
    date_time("MM/dd/yyyy HH:mm", "%m/%d/%Y %H:%M"),
    date_time("MM/dd/yyyy hh:mm tt", "%m/%d/%Y %I:%M %p"),
    date_time("dd-MM-yyyy HH:mm", "%d-%m-%Y %H:%M"),
    date_time("dd/MM/yyyy hh:mm tt", "%d/%m/%Y %I:%M %p"),
    date_time("MM-dd-yyyy HH:mm", "%m-%d-%Y %H:%M"),
    date_time("MM-dd-yyyy hh:mm tt", "%m-%d-%Y %I:%M %p"),
    date_time("yyyy-MM-dd HH:mm", "%Y-%m-%d %H:%M"),
    date_time("yyyy/MM/dd hh:mm tt", "%Y/%m/%d %I:%M %p"),
];

static ALLOWED_FORMATS: LazyLock<String> = LazyLock::new(|| {
    DATE_FORMATS
        .iter()
        .map(|format| format.display)
        .collect::<Vec<_>>()
        .join(", ")
});

/// Comma separated list of accepted layouts, for error messages
pub fn allowed_date_formats() -> &'static str {
    &ALLOWED_FORMATS
}

/// Parse a date against [`DATE_FORMATS`]
///
/// Date-only layouts resolve to midnight.
///
/// # Example
///
/// ```rust
/// use forecast_core::query::parse_date;
///
/// let parsed = parse_date("2024-01-15").unwrap();
/// assert_eq!(parsed.to_string(), "2024-01-15 00:00:00");
/// assert!(parse_date("15/13/2024").is_err());
/// ```
pub fn parse_date(input: &str) -> Result<NaiveDateTime, QueryError> {
    let input = input.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| parse_with(input, format))
        .ok_or_else(|| QueryError::UnparseableDate {
            input: input.to_string(),
        })
}

fn parse_with(input: &str, format: &DateFormat) -> Option<NaiveDateTime> {
    if format.has_time {
        NaiveDateTime::parse_from_str(input, format.pattern).ok()
    } else {
        NaiveDate::parse_from_str(input, format.pattern)
            .ok()
            .and_then(|day| day.and_hms_opt(0, 0, 0))
    }
}

/// Check that `n` lies between `lower` and `upper`
///
/// Inclusive bounds admit both endpoints. Exclusive bounds are half-open:
/// the lower endpoint is admitted and the upper one is not.
///
/// ```rust
/// use forecast_core::query::between;
///
/// assert!(between(10, 3, 10, true));
/// assert!(between(3, 3, 10, false));
/// assert!(!between(10, 3, 10, false));
/// ```
pub fn between<T: PartialOrd>(n: T, lower: T, upper: T, inclusive: bool) -> bool {
    if inclusive {
        lower <= n && n <= upper
    } else {
        lower <= n && n < upper
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    #[test]
    fn test_between_inclusive_and_exclusive() {
        assert!(between(5, 1, 10, false));
        assert!(between(1, 1, 10, false));
        assert!(!between(0, 1, 10, false));
        assert!(!between(10, 1, 10, false));
        assert!(between(1, 1, 10, true));
        assert!(between(10, 1, 10, true));
        assert!(!between(11, 1, 10, true));
    }

    #[test]
    fn test_parse_iso_date() {
        let parsed = parse_date("2024-01-15").unwrap();
        assert_eq!(parsed.date(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(parsed.hour(), 0);
    }

    #[test]
    fn test_invalid_month_fails_every_format() {
        let err = parse_date("15/13/2024").unwrap_err();
        assert!(matches!(err, QueryError::UnparseableDate { ref input } if input == "15/13/2024"));
        assert!(err.to_string().contains("dd/MM/yyyy, dd-MM-yyyy"));
    }

    #[test]
    fn test_day_first_wins_over_month_first() {
        // 03/04/2024 matches dd/MM/yyyy before MM/dd/yyy
        let parsed = parse_date("03/04/2024").unwrap();
        assert_eq!(parsed.date(), NaiveDate::from_ymd_opt(2024, 4, 3).unwrap());

        // only month-first can read a day of 25
        let parsed = parse_date("04/25/2024").unwrap();
        assert_eq!(parsed.date(), NaiveDate::from_ymd_opt(2024, 4, 25).unwrap());
    }

    #[test]
    fn test_twelve_hour_clock() {
        let parsed = parse_date("01/15/2024 03:30 PM").unwrap();
        assert_eq!(parsed.hour(), 15);
        assert_eq!(parsed.minute(), 30);

        let parsed = parse_date("2024/01/15 11:05 am").unwrap();
        assert_eq!(parsed.hour(), 11);
    }

    #[test]
    fn test_twenty_four_hour_clock() {
        let parsed = parse_date("2024-01-15 18:45").unwrap();
        assert_eq!(parsed.hour(), 18);
    }

    #[test]
    fn test_allowed_formats_listing() {
        let formats = allowed_date_formats();
        assert!(formats.starts_with("dd/MM/yyyy"));
        assert!(formats.ends_with("yyyy/MM/dd hh:mm tt"));
        assert_eq!(formats.split(", ").count(), DATE_FORMATS.len());
    }
}

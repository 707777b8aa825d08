use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static CALENDAR_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date pattern"));

/// Suffix appended to a bare calendar date to make it a UTC midnight instant.
pub const MIDNIGHT_UTC_SUFFIX: &str = "T00:00:00.000Z";

/// Returns `true` if the string is exactly `YYYY-MM-DD` and names a real day.
pub fn is_calendar_date(value: &str) -> bool {
    CALENDAR_DATE.is_match(value) && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

/// Expand a bare calendar date to an ISO-8601 instant at UTC midnight.
///
/// Returns `None` when the value already carries a time part or is not a
/// valid calendar date.
///
/// ```
/// use intentql::validators::expand_calendar_date;
///
/// assert_eq!(expand_calendar_date("2024-01-15").as_deref(), Some("2024-01-15T00:00:00.000Z"));
/// assert_eq!(expand_calendar_date("2024-01-15T10:00:00Z"), None);
/// assert_eq!(expand_calendar_date("2024-02-30"), None);
/// ```
pub fn expand_calendar_date(value: &str) -> Option<String> {
    if value.contains('T') || !is_calendar_date(value) {
        return None;
    }
    let mut expanded = String::with_capacity(value.len() + MIDNIGHT_UTC_SUFFIX.len());
    expanded.push_str(value);
    expanded.push_str(MIDNIGHT_UTC_SUFFIX);
    Some(expanded)
}

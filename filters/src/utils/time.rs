//! Time utility functions

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};

/// Start of the UTC calendar day containing the given instant
pub fn start_of_day(instant: DateTime<Utc>) -> DateTime<Utc> {
    Utc.from_utc_datetime(&instant.date_naive().and_time(NaiveTime::MIN))
}

/// End of the UTC calendar day containing the given instant
/// (last representable millisecond, 23:59:59.999)
pub fn end_of_day(instant: DateTime<Utc>) -> DateTime<Utc> {
    start_of_day(instant) + Duration::days(1) - Duration::milliseconds(1)
}

/// Parse a date value in the formats filter conditions carry:
/// RFC 3339 timestamps or plain `YYYY-MM-DD` dates (midnight UTC).
///
/// Returns None when the string matches neither format.
pub fn parse_date_value(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|date| Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
}

/// Render an instant the way leaf parameters carry timestamps
/// (RFC 3339 with millisecond precision, Z suffix)
pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

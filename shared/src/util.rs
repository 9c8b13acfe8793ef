//! Small cross-crate utilities

/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Parse an RFC 3339 / ISO-8601 date or datetime into epoch milliseconds.
///
/// Accepts full timestamps (`2026-08-25T10:00:00Z`) and bare dates
/// (`2026-08-25`, interpreted as midnight UTC).
pub fn parse_millis(input: &str) -> Option<i64> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(input) {
        return Some(dt.timestamp_millis());
    }
    chrono::NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}

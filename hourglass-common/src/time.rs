//! Timestamp utilities

use chrono::{DateTime, Datelike, Duration, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Elapsed time between two instants, in fractional hours.
///
/// Clamped at zero: a stop that lands before its start (clock adjustment)
/// records zero elapsed time rather than a negative duration.
pub fn hours_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    let millis = (end - start).num_milliseconds();
    if millis <= 0 {
        return 0.0;
    }
    millis as f64 / 3_600_000.0
}

/// Monday..Sunday bounds of the week containing `at`
pub fn week_range(at: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let days_from_monday = at.weekday().num_days_from_monday() as i64;
    let start = at - Duration::days(days_from_monday);
    let end = start + Duration::days(6);
    (start, end)
}

/// True when both instants fall on the same UTC calendar day
pub fn same_utc_day(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a.date_naive() == b.date_naive()
}

//! Data access layer over the shared SQLite pool
//!
//! Timestamps are stored as RFC 3339 text; all parsing happens here so the
//! rest of the crate only sees `DateTime<Utc>`.

pub mod plans;
pub mod timers;
pub mod users;

use chrono::{DateTime, Utc};
use hourglass_common::{Error, Result};

/// Parse an RFC 3339 timestamp column
pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Malformed timestamp in database ({}): {}", raw, e)))
}

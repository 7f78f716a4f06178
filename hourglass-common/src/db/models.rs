//! Database models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A study plan for one subject
///
/// Plans are append-only: edits arrive as new rows and removal is an
/// explicit id-based delete. `total_hours_day` and `total_hours_month` are
/// derived at insert time and stored denormalized, mirroring the sheet
/// columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub id: i64,
    pub user_id: String,
    pub subject: String,
    pub days: i64,
    pub hours_per_day: f64,
    pub total_hours_day: f64,
    pub total_hours_month: f64,
    pub created_at: DateTime<Utc>,
}

/// One completed start/stop timer session
///
/// Immutable once written. `planned_hours` is a snapshot of the matching
/// plan's hours-per-day at stop time; later plan edits do not rewrite it.
/// `total_hours` is the running total for this user+subject including this
/// entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerEntry {
    pub id: i64,
    pub user_id: String,
    pub subject: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub elapsed_hours: f64,
    pub planned_hours: f64,
    pub total_hours: f64,
    pub created_at: DateTime<Utc>,
}

/// The active timer for one user, if any
///
/// At most one row per user. Starting a new timer overwrites this row;
/// stopping deletes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerSession {
    pub user_id: String,
    pub subject: String,
    pub started_at: DateTime<Utc>,
}

/// A registered user account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub guid: String,
    pub username: String,
    pub password_hash: String,
    pub password_salt: String,
}

/// A login session resolved from the session cookie
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user_guid: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Setting {
    pub key: String,
    pub value: String,
}

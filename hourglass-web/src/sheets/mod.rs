//! Spreadsheet mirror
//!
//! The database is the source of truth; the spreadsheet is a derived export.
//! Handlers enqueue a [`SyncRequest`] after writes and a single background
//! task performs the actual exports, so spreadsheet writes are serialized
//! and a mirror failure never fails the originating request.

mod client;
mod sync;

pub use client::{SheetsClient, SheetsError};
pub use sync::{spawn_syncer, SyncHandle, SyncRequest};

/// Title of the plans worksheet
pub const PLAN_SHEET_TITLE: &str = "Plans";

/// Title of the timer roll-up worksheet
pub const TIMER_SHEET_TITLE: &str = "Timers";

/// Plans worksheet header row
pub const PLAN_HEADER: [&str; 5] = [
    "Subject",
    "Days",
    "Hours per Day",
    "Total Hours per Day",
    "Total Hours per Month",
];

/// Timer worksheet header row (3-column layout, schema version 1)
pub const TIMER_HEADER: [&str; 3] = ["Subject", "Daily Hours", "Rolling Total"];

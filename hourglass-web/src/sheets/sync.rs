//! Background export task for the spreadsheet mirror
//!
//! Handlers call [`SyncHandle::request`] after database writes; the task
//! coalesces bursts, re-derives full tables from the database and overwrites
//! the corresponding worksheet. Serializing every export through this one
//! task is what removes the read-modify-write race a per-request mirror
//! write would have.

use std::time::Duration;

use sqlx::SqlitePool;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::rollup;
use crate::sheets::{SheetsClient, PLAN_HEADER, PLAN_SHEET_TITLE, TIMER_HEADER, TIMER_SHEET_TITLE};
use crate::store;

/// Which table to re-export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncRequest {
    Plans,
    Timers,
}

/// Retry attempts per export before giving up until the next request
const MAX_ATTEMPTS: u32 = 3;

/// Cheap cloneable handle for enqueueing sync requests
///
/// A disabled handle (mirror off) accepts and drops requests, so callers
/// never special-case the configuration.
#[derive(Clone)]
pub struct SyncHandle {
    tx: Option<mpsc::Sender<SyncRequest>>,
}

impl SyncHandle {
    /// Handle that drops all requests (mirror disabled)
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Enqueue an export; never blocks the caller
    pub fn request(&self, request: SyncRequest) {
        let Some(tx) = &self.tx else {
            return;
        };
        // A full queue means a sync is already pending that will pick up
        // this table's current state anyway.
        if let Err(mpsc::error::TrySendError::Closed(_)) = tx.try_send(request) {
            warn!("Sheet sync task is gone; {:?} export dropped", request);
        }
    }
}

/// Spawn the syncer task and return a handle for enqueueing requests
pub fn spawn_syncer(db: SqlitePool, client: SheetsClient, coalesce: Duration) -> SyncHandle {
    let (tx, rx) = mpsc::channel(32);
    tokio::spawn(run_syncer(db, client, rx, coalesce));
    SyncHandle { tx: Some(tx) }
}

async fn run_syncer(
    db: SqlitePool,
    client: SheetsClient,
    mut rx: mpsc::Receiver<SyncRequest>,
    coalesce: Duration,
) {
    info!("Sheet sync task started");
    let mut sheets_ready = false;

    while let Some(first) = rx.recv().await {
        // Let a burst of writes settle, then drain everything pending
        tokio::time::sleep(coalesce).await;
        let mut plans = first == SyncRequest::Plans;
        let mut timers = first == SyncRequest::Timers;
        while let Ok(request) = rx.try_recv() {
            match request {
                SyncRequest::Plans => plans = true,
                SyncRequest::Timers => timers = true,
            }
        }

        if !sheets_ready {
            match client.ensure_sheets_exist().await {
                Ok(()) => sheets_ready = true,
                Err(e) => {
                    error!("Could not prepare mirror worksheets: {}", e);
                    continue;
                }
            }
        }

        if plans {
            retry_export(&db, &client, SyncRequest::Plans).await;
        }
        if timers {
            retry_export(&db, &client, SyncRequest::Timers).await;
        }
    }

    info!("Sheet sync task stopped");
}

async fn retry_export(db: &SqlitePool, client: &SheetsClient, which: SyncRequest) {
    for attempt in 1..=MAX_ATTEMPTS {
        let result = match which {
            SyncRequest::Plans => export_plans(db, client).await,
            SyncRequest::Timers => export_timers(db, client).await,
        };
        match result {
            Ok(rows) => {
                debug!("Exported {} rows to {:?} sheet", rows, which);
                return;
            }
            Err(e) => {
                warn!(
                    "{:?} export attempt {}/{} failed: {}",
                    which, attempt, MAX_ATTEMPTS, e
                );
                if attempt < MAX_ATTEMPTS {
                    tokio::time::sleep(Duration::from_secs(2u64.pow(attempt))).await;
                }
            }
        }
    }
    // The database stays authoritative; the next request converges the mirror
    error!("{:?} export failed after {} attempts", which, MAX_ATTEMPTS);
}

/// Full-table snapshot of the plans sheet
async fn export_plans(db: &SqlitePool, client: &SheetsClient) -> anyhow::Result<usize> {
    let plans = store::plans::list_all_plans(db).await?;
    let rows: Vec<Vec<String>> = plans.iter().map(plan_row).collect();
    let count = rows.len();
    client
        .overwrite_sheet(PLAN_SHEET_TITLE, &PLAN_HEADER, rows)
        .await?;
    Ok(count)
}

/// Per-subject roll-up snapshot of the timer sheet
async fn export_timers(db: &SqlitePool, client: &SheetsClient) -> anyhow::Result<usize> {
    let entries = store::timers::list_all_entries(db).await?;
    let today = hourglass_common::time::now();

    let rows: Vec<Vec<String>> = rollup::subjects_of(&entries)
        .into_iter()
        .map(|subject| {
            let (daily, rolling) = rollup::daily_and_rolling(&entries, &subject, today);
            vec![subject, format_hours(daily), format_hours(rolling)]
        })
        .collect();
    let count = rows.len();
    client
        .overwrite_sheet(TIMER_SHEET_TITLE, &TIMER_HEADER, rows)
        .await?;
    Ok(count)
}

fn plan_row(plan: &hourglass_common::db::models::Plan) -> Vec<String> {
    vec![
        plan.subject.clone(),
        plan.days.to_string(),
        format_hours(plan.hours_per_day),
        format_hours(plan.total_hours_day),
        format_hours(plan.total_hours_month),
    ]
}

fn format_hours(hours: f64) -> String {
    format!("{:.2}", hours)
}

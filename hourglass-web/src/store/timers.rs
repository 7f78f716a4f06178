//! Timer store
//!
//! The active timer is an explicit per-user row in `timer_sessions`, not
//! ambient session state. Stopping reconciles against the plan store and the
//! entry history inside one transaction, so concurrent stops serialize at
//! the database and every running total chains correctly.

use chrono::{DateTime, Utc};
use hourglass_common::db::models::{TimerEntry, TimerSession};
use hourglass_common::time::hours_between;
use hourglass_common::{Error, Result};
use sqlx::SqlitePool;
use tracing::info;

type EntryRow = (i64, String, String, String, String, f64, f64, f64, String);

fn entry_from_row(row: EntryRow) -> Result<TimerEntry> {
    Ok(TimerEntry {
        id: row.0,
        user_id: row.1,
        subject: row.2,
        started_at: super::parse_timestamp(&row.3)?,
        ended_at: super::parse_timestamp(&row.4)?,
        elapsed_hours: row.5,
        planned_hours: row.6,
        total_hours: row.7,
        created_at: super::parse_timestamp(&row.8)?,
    })
}

const ENTRY_COLUMNS: &str = "id, user_id, subject, started_at, ended_at, elapsed_hours, \
                             planned_hours, total_hours, created_at";

/// Start (or restart) the user's timer
///
/// A previously running timer is overwritten without warning; its time is
/// discarded, matching the double-start behavior users rely on to recover
/// from a forgotten timer.
pub async fn start_timer(
    db: &SqlitePool,
    user_id: &str,
    subject: &str,
    now: DateTime<Utc>,
) -> Result<TimerSession> {
    let subject = subject.trim();
    if subject.is_empty() {
        return Err(Error::InvalidInput("Subject must not be empty".to_string()));
    }

    sqlx::query(
        "INSERT OR REPLACE INTO timer_sessions (user_id, subject, started_at) VALUES (?, ?, ?)",
    )
    .bind(user_id)
    .bind(subject)
    .bind(now.to_rfc3339())
    .execute(db)
    .await?;

    info!("Timer started for '{}'", subject);

    Ok(TimerSession {
        user_id: user_id.to_string(),
        subject: subject.to_string(),
        started_at: now,
    })
}

/// The user's active timer, if any
pub async fn active_session(db: &SqlitePool, user_id: &str) -> Result<Option<TimerSession>> {
    let row: Option<(String, String)> =
        sqlx::query_as("SELECT subject, started_at FROM timer_sessions WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(db)
            .await?;

    row.map(|(subject, started_raw)| {
        Ok(TimerSession {
            user_id: user_id.to_string(),
            subject,
            started_at: super::parse_timestamp(&started_raw)?,
        })
    })
    .transpose()
}

/// Stop the user's timer and record a reconciled entry
///
/// Returns `Error::TimerNotRunning` (and writes nothing) when no timer is
/// active. On success the new entry carries:
/// - `elapsed_hours`: wall-clock duration of this session, clamped at 0
/// - `planned_hours`: snapshot of the newest matching plan's hours-per-day
///   (0 when the subject has no plan)
/// - `total_hours`: sum of all prior entries for this user+subject plus
///   this session
pub async fn stop_timer(db: &SqlitePool, user_id: &str, now: DateTime<Utc>) -> Result<TimerEntry> {
    let mut tx = db.begin().await?;

    let session: Option<(String, String)> =
        sqlx::query_as("SELECT subject, started_at FROM timer_sessions WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;

    let Some((subject, started_raw)) = session else {
        return Err(Error::TimerNotRunning);
    };
    let started_at = super::parse_timestamp(&started_raw)?;
    let elapsed_hours = hours_between(started_at, now);

    // Snapshot of the newest plan for this subject; plan edits after this
    // point never rewrite the entry.
    let planned_hours: f64 = sqlx::query_scalar(
        "SELECT hours_per_day FROM plans WHERE user_id = ? AND subject = ? ORDER BY id DESC LIMIT 1",
    )
    .bind(user_id)
    .bind(&subject)
    .fetch_optional(&mut *tx)
    .await?
    .unwrap_or(0.0);

    let prior_hours: f64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(elapsed_hours), 0.0) FROM timer_entries WHERE user_id = ? AND subject = ?",
    )
    .bind(user_id)
    .bind(&subject)
    .fetch_one(&mut *tx)
    .await?;

    let total_hours = prior_hours + elapsed_hours;

    let result = sqlx::query(
        r#"
        INSERT INTO timer_entries
            (user_id, subject, started_at, ended_at, elapsed_hours, planned_hours, total_hours, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(&subject)
    .bind(started_at.to_rfc3339())
    .bind(now.to_rfc3339())
    .bind(elapsed_hours)
    .bind(planned_hours)
    .bind(total_hours)
    .bind(now.to_rfc3339())
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM timer_sessions WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!(
        "Timer stopped for '{}': {:.2} h this session, {:.2} h total",
        subject, elapsed_hours, total_hours
    );

    Ok(TimerEntry {
        id: result.last_insert_rowid(),
        user_id: user_id.to_string(),
        subject,
        started_at,
        ended_at: now,
        elapsed_hours,
        planned_hours,
        total_hours,
        created_at: now,
    })
}

/// All completed entries for a user, oldest first
pub async fn list_entries(db: &SqlitePool, user_id: &str) -> Result<Vec<TimerEntry>> {
    let rows: Vec<EntryRow> = sqlx::query_as(&format!(
        "SELECT {} FROM timer_entries WHERE user_id = ? ORDER BY id",
        ENTRY_COLUMNS
    ))
    .bind(user_id)
    .fetch_all(db)
    .await?;

    rows.into_iter().map(entry_from_row).collect()
}

/// All completed entries across every user, oldest first
///
/// Used by the spreadsheet mirror, which aggregates per subject without a
/// user column.
pub async fn list_all_entries(db: &SqlitePool) -> Result<Vec<TimerEntry>> {
    let rows: Vec<EntryRow> = sqlx::query_as(&format!(
        "SELECT {} FROM timer_entries ORDER BY id",
        ENTRY_COLUMNS
    ))
    .fetch_all(db)
    .await?;

    rows.into_iter().map(entry_from_row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::plans::create_plan;
    use chrono::{Duration, TimeZone};
    use hourglass_common::db::init::{init_database, ANONYMOUS_USER_GUID};
    use tempfile::TempDir;

    async fn test_pool() -> (TempDir, SqlitePool) {
        let dir = TempDir::new().unwrap();
        let pool = init_database(&dir.path().join("hourglass.db")).await.unwrap();
        (dir, pool)
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_stop_without_start_writes_nothing() {
        let (_dir, pool) = test_pool().await;

        let result = stop_timer(&pool, ANONYMOUS_USER_GUID, t0()).await;
        assert!(matches!(result, Err(Error::TimerNotRunning)));

        assert!(list_entries(&pool, ANONYMOUS_USER_GUID).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_first_session_running_total() {
        let (_dir, pool) = test_pool().await;

        create_plan(&pool, ANONYMOUS_USER_GUID, "Math", 5, 2.0, t0())
            .await
            .unwrap();

        start_timer(&pool, ANONYMOUS_USER_GUID, "Math", t0()).await.unwrap();
        let entry = stop_timer(&pool, ANONYMOUS_USER_GUID, t0() + Duration::minutes(90))
            .await
            .unwrap();

        assert!((entry.elapsed_hours - 1.5).abs() < 1e-9);
        assert!((entry.total_hours - 1.5).abs() < 1e-9);
        assert_eq!(entry.planned_hours, 2.0);

        // Session row is consumed
        assert!(active_session(&pool, ANONYMOUS_USER_GUID).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_running_total_chains_across_sessions() {
        let (_dir, pool) = test_pool().await;

        let mut clock = t0();
        start_timer(&pool, ANONYMOUS_USER_GUID, "Math", clock).await.unwrap();
        clock += Duration::minutes(90);
        let first = stop_timer(&pool, ANONYMOUS_USER_GUID, clock).await.unwrap();

        clock += Duration::hours(4);
        start_timer(&pool, ANONYMOUS_USER_GUID, "Math", clock).await.unwrap();
        clock += Duration::hours(1);
        let second = stop_timer(&pool, ANONYMOUS_USER_GUID, clock).await.unwrap();

        assert!((first.total_hours - 1.5).abs() < 1e-9);
        assert!((second.elapsed_hours - 1.0).abs() < 1e-9);
        assert!((second.total_hours - 2.5).abs() < 1e-9);

        // Chain property over the stored history
        let entries = list_entries(&pool, ANONYMOUS_USER_GUID).await.unwrap();
        let mut sum = 0.0;
        for entry in &entries {
            sum += entry.elapsed_hours;
            assert!((entry.total_hours - sum).abs() < 1e-9);
        }
    }

    #[tokio::test]
    async fn test_totals_are_per_subject() {
        let (_dir, pool) = test_pool().await;

        start_timer(&pool, ANONYMOUS_USER_GUID, "Math", t0()).await.unwrap();
        stop_timer(&pool, ANONYMOUS_USER_GUID, t0() + Duration::hours(2))
            .await
            .unwrap();

        let later = t0() + Duration::hours(3);
        start_timer(&pool, ANONYMOUS_USER_GUID, "History", later).await.unwrap();
        let entry = stop_timer(&pool, ANONYMOUS_USER_GUID, later + Duration::hours(1))
            .await
            .unwrap();

        // History's total does not include Math's two hours
        assert!((entry.total_hours - 1.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_double_start_overwrites() {
        let (_dir, pool) = test_pool().await;

        start_timer(&pool, ANONYMOUS_USER_GUID, "Math", t0()).await.unwrap();
        start_timer(
            &pool,
            ANONYMOUS_USER_GUID,
            "History",
            t0() + Duration::minutes(30),
        )
        .await
        .unwrap();

        let active = active_session(&pool, ANONYMOUS_USER_GUID)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(active.subject, "History");

        // Stopping records only the second timer
        let entry = stop_timer(&pool, ANONYMOUS_USER_GUID, t0() + Duration::minutes(90))
            .await
            .unwrap();
        assert_eq!(entry.subject, "History");
        assert!((entry.elapsed_hours - 1.0).abs() < 1e-9);
        assert_eq!(
            list_entries(&pool, ANONYMOUS_USER_GUID).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn test_planned_hours_snapshot_ignores_later_edits() {
        let (_dir, pool) = test_pool().await;

        create_plan(&pool, ANONYMOUS_USER_GUID, "Math", 5, 2.0, t0())
            .await
            .unwrap();
        start_timer(&pool, ANONYMOUS_USER_GUID, "Math", t0()).await.unwrap();
        let entry = stop_timer(&pool, ANONYMOUS_USER_GUID, t0() + Duration::hours(1))
            .await
            .unwrap();
        assert_eq!(entry.planned_hours, 2.0);

        // A newer plan changes future snapshots, not history
        create_plan(&pool, ANONYMOUS_USER_GUID, "Math", 5, 3.0, t0())
            .await
            .unwrap();
        let entries = list_entries(&pool, ANONYMOUS_USER_GUID).await.unwrap();
        assert_eq!(entries[0].planned_hours, 2.0);

        start_timer(&pool, ANONYMOUS_USER_GUID, "Math", t0()).await.unwrap();
        let entry = stop_timer(&pool, ANONYMOUS_USER_GUID, t0() + Duration::hours(1))
            .await
            .unwrap();
        assert_eq!(entry.planned_hours, 3.0);
    }

    #[tokio::test]
    async fn test_subject_without_plan_snapshots_zero() {
        let (_dir, pool) = test_pool().await;

        start_timer(&pool, ANONYMOUS_USER_GUID, "Chess", t0()).await.unwrap();
        let entry = stop_timer(&pool, ANONYMOUS_USER_GUID, t0() + Duration::hours(1))
            .await
            .unwrap();
        assert_eq!(entry.planned_hours, 0.0);
    }

    #[tokio::test]
    async fn test_backwards_clock_clamps_to_zero() {
        let (_dir, pool) = test_pool().await;

        start_timer(&pool, ANONYMOUS_USER_GUID, "Math", t0()).await.unwrap();
        let entry = stop_timer(&pool, ANONYMOUS_USER_GUID, t0() - Duration::minutes(5))
            .await
            .unwrap();
        assert_eq!(entry.elapsed_hours, 0.0);
        assert_eq!(entry.total_hours, 0.0);
    }
}

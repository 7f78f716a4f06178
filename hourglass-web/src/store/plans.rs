//! Plan store
//!
//! Plans are append-only rows: duplicate subjects accumulate, edits arrive
//! as new rows, and removal is an explicit id-based delete.

use chrono::{DateTime, Utc};
use hourglass_common::db::models::Plan;
use hourglass_common::{Error, Result};
use sqlx::SqlitePool;
use tracing::info;

type PlanRow = (i64, String, String, i64, f64, f64, f64, String);

fn plan_from_row(row: PlanRow) -> Result<Plan> {
    Ok(Plan {
        id: row.0,
        user_id: row.1,
        subject: row.2,
        days: row.3,
        hours_per_day: row.4,
        total_hours_day: row.5,
        total_hours_month: row.6,
        created_at: super::parse_timestamp(&row.7)?,
    })
}

const PLAN_COLUMNS: &str =
    "id, user_id, subject, days, hours_per_day, total_hours_day, total_hours_month, created_at";

/// Validate and record a new study plan
///
/// Derived totals are computed here and stored denormalized:
/// `total_hours_day = hours_per_day`, `total_hours_month = days * hours_per_day`.
pub async fn create_plan(
    db: &SqlitePool,
    user_id: &str,
    subject: &str,
    days: i64,
    hours_per_day: f64,
    now: DateTime<Utc>,
) -> Result<Plan> {
    let subject = subject.trim();
    if subject.is_empty() {
        return Err(Error::InvalidInput("Subject must not be empty".to_string()));
    }
    if days <= 0 {
        return Err(Error::InvalidInput(
            "Number of days must be a positive integer".to_string(),
        ));
    }
    if !hours_per_day.is_finite() || hours_per_day < 0.0 {
        return Err(Error::InvalidInput(
            "Hours per day must be a non-negative number".to_string(),
        ));
    }

    let total_hours_day = hours_per_day;
    let total_hours_month = days as f64 * hours_per_day;

    let result = sqlx::query(
        r#"
        INSERT INTO plans (user_id, subject, days, hours_per_day, total_hours_day, total_hours_month, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(subject)
    .bind(days)
    .bind(hours_per_day)
    .bind(total_hours_day)
    .bind(total_hours_month)
    .bind(now.to_rfc3339())
    .execute(db)
    .await?;

    info!(
        "Recorded plan for '{}': {} days x {} h/day",
        subject, days, hours_per_day
    );

    Ok(Plan {
        id: result.last_insert_rowid(),
        user_id: user_id.to_string(),
        subject: subject.to_string(),
        days,
        hours_per_day,
        total_hours_day,
        total_hours_month,
        created_at: now,
    })
}

/// List all plans for a user, oldest first
pub async fn list_plans(db: &SqlitePool, user_id: &str) -> Result<Vec<Plan>> {
    let rows: Vec<PlanRow> = sqlx::query_as(&format!(
        "SELECT {} FROM plans WHERE user_id = ? ORDER BY id",
        PLAN_COLUMNS
    ))
    .bind(user_id)
    .fetch_all(db)
    .await?;

    rows.into_iter().map(plan_from_row).collect()
}

/// List every plan across all users, oldest first
///
/// Used by the spreadsheet mirror, whose layout carries no user column.
pub async fn list_all_plans(db: &SqlitePool) -> Result<Vec<Plan>> {
    let rows: Vec<PlanRow> =
        sqlx::query_as(&format!("SELECT {} FROM plans ORDER BY id", PLAN_COLUMNS))
            .fetch_all(db)
            .await?;

    rows.into_iter().map(plan_from_row).collect()
}

/// Most recently created plan matching a subject, if any
///
/// Duplicate subjects are allowed; the newest row (highest id) wins.
pub async fn latest_plan_for_subject(
    db: &SqlitePool,
    user_id: &str,
    subject: &str,
) -> Result<Option<Plan>> {
    let row: Option<PlanRow> = sqlx::query_as(&format!(
        "SELECT {} FROM plans WHERE user_id = ? AND subject = ? ORDER BY id DESC LIMIT 1",
        PLAN_COLUMNS
    ))
    .bind(user_id)
    .bind(subject)
    .fetch_optional(db)
    .await?;

    row.map(plan_from_row).transpose()
}

/// Delete a plan by id
///
/// Deleting an id that does not exist (or belongs to another user) returns
/// `Error::NotFound` rather than silently succeeding.
pub async fn delete_plan(db: &SqlitePool, user_id: &str, id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM plans WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("No plan with id {}", id)));
    }

    info!("Deleted plan {}", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
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
    async fn test_create_plan_derives_totals() {
        let (_dir, pool) = test_pool().await;

        let plan = create_plan(&pool, ANONYMOUS_USER_GUID, "Math", 5, 2.0, t0())
            .await
            .unwrap();

        assert_eq!(plan.total_hours_day, 2.0);
        assert_eq!(plan.total_hours_month, 10.0);

        let stored = list_plans(&pool, ANONYMOUS_USER_GUID).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].subject, "Math");
        assert_eq!(stored[0].total_hours_month, 10.0);
        assert_eq!(stored[0].created_at, t0());
    }

    #[tokio::test]
    async fn test_create_plan_rejects_bad_input() {
        let (_dir, pool) = test_pool().await;

        assert!(matches!(
            create_plan(&pool, ANONYMOUS_USER_GUID, "  ", 5, 2.0, t0()).await,
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            create_plan(&pool, ANONYMOUS_USER_GUID, "Math", 0, 2.0, t0()).await,
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            create_plan(&pool, ANONYMOUS_USER_GUID, "Math", 5, -1.0, t0()).await,
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            create_plan(&pool, ANONYMOUS_USER_GUID, "Math", 5, f64::NAN, t0()).await,
            Err(Error::InvalidInput(_))
        ));

        assert!(list_plans(&pool, ANONYMOUS_USER_GUID).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_subjects_accumulate_and_newest_wins() {
        let (_dir, pool) = test_pool().await;

        create_plan(&pool, ANONYMOUS_USER_GUID, "Math", 5, 2.0, t0())
            .await
            .unwrap();
        create_plan(&pool, ANONYMOUS_USER_GUID, "Math", 3, 4.0, t0())
            .await
            .unwrap();

        let all = list_plans(&pool, ANONYMOUS_USER_GUID).await.unwrap();
        assert_eq!(all.len(), 2);

        let latest = latest_plan_for_subject(&pool, ANONYMOUS_USER_GUID, "Math")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.hours_per_day, 4.0);
    }

    #[tokio::test]
    async fn test_delete_missing_plan_is_not_found() {
        let (_dir, pool) = test_pool().await;

        let result = delete_plan(&pool, ANONYMOUS_USER_GUID, 999).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_existing_plan() {
        let (_dir, pool) = test_pool().await;

        let plan = create_plan(&pool, ANONYMOUS_USER_GUID, "Math", 5, 2.0, t0())
            .await
            .unwrap();
        delete_plan(&pool, ANONYMOUS_USER_GUID, plan.id).await.unwrap();

        assert!(list_plans(&pool, ANONYMOUS_USER_GUID).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_plans_are_scoped_per_user() {
        let (_dir, pool) = test_pool().await;

        sqlx::query(
            "INSERT INTO users (guid, username, password_hash, password_salt) VALUES ('u2', 'kim', 'h', 's')",
        )
        .execute(&pool)
        .await
        .unwrap();

        let plan = create_plan(&pool, "u2", "Math", 5, 2.0, t0()).await.unwrap();

        assert!(list_plans(&pool, ANONYMOUS_USER_GUID).await.unwrap().is_empty());
        // Another user cannot delete it either
        assert!(matches!(
            delete_plan(&pool, ANONYMOUS_USER_GUID, plan.id).await,
            Err(Error::NotFound(_))
        ));
    }
}

//! Weekly tracker view

use axum::{extract::State, Extension, Json};
use hourglass_common::db::models::TimerSession;
use hourglass_common::time;
use serde::Serialize;

use crate::api::accounts::CurrentUser;
use crate::api::error::ApiError;
use crate::rollup::{self, SubjectSummary};
use crate::store;
use crate::AppState;

/// Tracker response: one summary row per subject plus the active timer
#[derive(Debug, Serialize)]
pub struct TrackerResponse {
    pub week_start: String,
    pub week_end: String,
    pub subjects: Vec<SubjectSummary>,
    pub active: Option<TimerSession>,
}

/// GET /api/tracker
///
/// Pure read-side projection; tracked hours cover the full history while
/// the week bounds are display context.
pub async fn get_tracker(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<TrackerResponse>, ApiError> {
    let plans = store::plans::list_plans(&state.db, &user.guid).await?;
    let entries = store::timers::list_entries(&state.db, &user.guid).await?;
    let active = store::timers::active_session(&state.db, &user.guid).await?;

    let (week_start, week_end) = time::week_range(time::now());

    Ok(Json(TrackerResponse {
        week_start: week_start.format("%B %d, %Y").to_string(),
        week_end: week_end.format("%B %d, %Y").to_string(),
        subjects: rollup::weekly_summary(&plans, &entries),
        active,
    }))
}

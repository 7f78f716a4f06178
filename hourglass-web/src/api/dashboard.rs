//! Login-gated dashboard data

use axum::{extract::State, Extension, Json};
use hourglass_common::db::models::TimerEntry;
use serde::Serialize;

use crate::api::accounts::CurrentUser;
use crate::api::error::ApiError;
use crate::rollup::{self, SubjectSummary};
use crate::store;
use crate::AppState;

/// Number of recent entries shown on the dashboard
const RECENT_ENTRIES: usize = 10;

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub username: String,
    pub plan_count: usize,
    pub total_tracked_hours: f64,
    pub subjects: Vec<SubjectSummary>,
    pub recent_entries: Vec<TimerEntry>,
}

/// GET /api/dashboard
pub async fn get_dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let plans = store::plans::list_plans(&state.db, &user.guid).await?;
    let entries = store::timers::list_entries(&state.db, &user.guid).await?;

    let total_tracked_hours = entries.iter().map(|e| e.elapsed_hours).sum();
    let subjects = rollup::weekly_summary(&plans, &entries);
    let recent_entries: Vec<TimerEntry> =
        entries.iter().rev().take(RECENT_ENTRIES).cloned().collect();

    Ok(Json(DashboardResponse {
        username: user.username,
        plan_count: plans.len(),
        total_tracked_hours,
        subjects,
        recent_entries,
    }))
}

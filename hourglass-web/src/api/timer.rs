//! Timer endpoints

use axum::{extract::State, response::Redirect, Extension, Form, Json};
use hourglass_common::db::models::{TimerEntry, TimerSession};
use hourglass_common::time;
use serde::{Deserialize, Serialize};

use crate::api::accounts::CurrentUser;
use crate::api::error::ApiError;
use crate::sheets::SyncRequest;
use crate::store;
use crate::AppState;

/// Form fields for POST /start_timer
#[derive(Debug, Deserialize)]
pub struct StartTimerForm {
    pub subject: String,
}

#[derive(Debug, Serialize)]
pub struct EntriesResponse {
    pub entries: Vec<TimerEntry>,
}

#[derive(Debug, Serialize)]
pub struct ActiveTimerResponse {
    pub active: Option<TimerSession>,
}

/// POST /start_timer
///
/// Restarting while a timer runs silently replaces it; the previous start
/// time is discarded.
pub async fn start_timer(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Form(form): Form<StartTimerForm>,
) -> Result<Redirect, ApiError> {
    store::timers::start_timer(&state.db, &user.guid, &form.subject, time::now()).await?;
    Ok(Redirect::to("/tracker"))
}

/// POST /stop_timer
///
/// 409 when no timer is running; nothing is written in that case.
pub async fn stop_timer(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Redirect, ApiError> {
    store::timers::stop_timer(&state.db, &user.guid, time::now()).await?;

    state.sheets.request(SyncRequest::Timers);
    Ok(Redirect::to("/tracker"))
}

/// GET /api/timer/entries
pub async fn get_timer_entries(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<EntriesResponse>, ApiError> {
    let entries = store::timers::list_entries(&state.db, &user.guid).await?;
    Ok(Json(EntriesResponse { entries }))
}

/// GET /api/timer/active
pub async fn get_active_timer(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ActiveTimerResponse>, ApiError> {
    let active = store::timers::active_session(&state.db, &user.guid).await?;
    Ok(Json(ActiveTimerResponse { active }))
}

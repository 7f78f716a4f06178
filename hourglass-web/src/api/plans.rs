//! Plan endpoints

use axum::{
    extract::{Path, State},
    response::Redirect,
    Extension, Form, Json,
};
use hourglass_common::db::models::Plan;
use hourglass_common::time;
use hourglass_common::Error;
use serde::{Deserialize, Serialize};

use crate::api::accounts::CurrentUser;
use crate::api::error::ApiError;
use crate::sheets::SyncRequest;
use crate::store;
use crate::AppState;

/// Form fields for POST /add_plan (names match the planning page form)
#[derive(Debug, Deserialize)]
pub struct AddPlanForm {
    pub subject: String,
    pub number_of_days: String,
    pub number_of_hours_per_day: String,
}

/// Plan list response
#[derive(Debug, Serialize)]
pub struct PlansResponse {
    pub plans: Vec<Plan>,
}

/// GET /api/plans
pub async fn get_plans(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<PlansResponse>, ApiError> {
    let plans = store::plans::list_plans(&state.db, &user.guid).await?;
    Ok(Json(PlansResponse { plans }))
}

/// POST /add_plan
///
/// Form fields arrive as text; parse failures are invalid input (400), not
/// handler panics.
pub async fn add_plan(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Form(form): Form<AddPlanForm>,
) -> Result<Redirect, ApiError> {
    let days: i64 = form.number_of_days.trim().parse().map_err(|_| {
        Error::InvalidInput("Number of days must be a positive integer".to_string())
    })?;
    let hours_per_day: f64 = form.number_of_hours_per_day.trim().parse().map_err(|_| {
        Error::InvalidInput("Hours per day must be a non-negative number".to_string())
    })?;

    store::plans::create_plan(
        &state.db,
        &user.guid,
        &form.subject,
        days,
        hours_per_day,
        time::now(),
    )
    .await?;

    state.sheets.request(SyncRequest::Plans);
    Ok(Redirect::to("/planning"))
}

/// POST /delete_plan/:id
///
/// Unknown ids are 404, not a silent no-op.
pub async fn delete_plan(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Redirect, ApiError> {
    store::plans::delete_plan(&state.db, &user.guid, id).await?;

    state.sheets.request(SyncRequest::Plans);
    Ok(Redirect::to("/planning"))
}

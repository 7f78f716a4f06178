//! hourglass-web library - study planner web service
//!
//! Exposes the application state and router so integration tests can drive
//! the service without binding a socket.

use axum::Router;
use sqlx::SqlitePool;

use crate::sheets::SyncHandle;

pub mod api;
pub mod rollup;
pub mod sheets;
pub mod store;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (source of truth)
    pub db: SqlitePool,
    /// Handle for enqueueing spreadsheet mirror exports
    pub sheets: SyncHandle,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, sheets: SyncHandle) -> Self {
        Self { db, sheets }
    }
}

/// Build application router
///
/// The dashboard requires a login; every other page falls back to the
/// Anonymous user so the planner works without an account.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};
    use tower_http::trace::TraceLayer;

    // Routes that require a logged-in user
    let gated = Router::new()
        .route("/dashboard", get(api::serve_dashboard))
        .route("/api/dashboard", get(api::get_dashboard))
        .layer(middleware::from_fn(api::require_login));

    Router::new()
        // Static pages
        .route("/", get(api::serve_index))
        .route("/about", get(api::serve_about))
        .route("/contact", get(api::serve_contact))
        .route("/privacy", get(api::serve_privacy))
        .route("/terms", get(api::serve_terms))
        .route("/planning", get(api::serve_planning))
        .route("/tracker", get(api::serve_tracker))
        .route("/login", get(api::serve_login).post(api::login))
        .route("/register", get(api::serve_register).post(api::register))
        .route("/logout", post(api::logout))
        // Form endpoints (redirect on success)
        .route("/add_plan", post(api::add_plan))
        .route("/delete_plan/:id", post(api::delete_plan))
        .route("/start_timer", post(api::start_timer))
        .route("/stop_timer", post(api::stop_timer))
        // JSON API
        .route("/api/plans", get(api::get_plans))
        .route("/api/tracker", get(api::get_tracker))
        .route("/api/timer/entries", get(api::get_timer_entries))
        .route("/api/timer/active", get(api::get_active_timer))
        .merge(gated)
        .merge(api::health_routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::resolve_user,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

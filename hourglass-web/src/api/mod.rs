//! HTTP API handlers for hourglass-web

pub mod accounts;
pub mod dashboard;
pub mod error;
pub mod health;
pub mod pages;
pub mod plans;
pub mod timer;
pub mod tracker;

pub use accounts::{login, logout, register, require_login, resolve_user, CurrentUser};
pub use dashboard::get_dashboard;
pub use error::ApiError;
pub use health::health_routes;
pub use pages::{
    serve_about, serve_contact, serve_dashboard, serve_index, serve_login, serve_planning,
    serve_privacy, serve_register, serve_terms, serve_tracker,
};
pub use plans::{add_plan, delete_plan, get_plans};
pub use timer::{get_active_timer, get_timer_entries, start_timer, stop_timer};
pub use tracker::get_tracker;

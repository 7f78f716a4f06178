//! Static page serving
//!
//! Pages are compiled into the binary; the dynamic ones fetch their data
//! from the JSON API with inline scripts.

use axum::response::Html;

const INDEX_HTML: &str = include_str!("../ui/index.html");
const ABOUT_HTML: &str = include_str!("../ui/about.html");
const CONTACT_HTML: &str = include_str!("../ui/contact.html");
const PRIVACY_HTML: &str = include_str!("../ui/privacy.html");
const TERMS_HTML: &str = include_str!("../ui/terms.html");
const PLANNING_HTML: &str = include_str!("../ui/planning.html");
const TRACKER_HTML: &str = include_str!("../ui/tracker.html");
const LOGIN_HTML: &str = include_str!("../ui/login.html");
const REGISTER_HTML: &str = include_str!("../ui/register.html");
const DASHBOARD_HTML: &str = include_str!("../ui/dashboard.html");

/// GET /
pub async fn serve_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /about
pub async fn serve_about() -> Html<&'static str> {
    Html(ABOUT_HTML)
}

/// GET /contact
pub async fn serve_contact() -> Html<&'static str> {
    Html(CONTACT_HTML)
}

/// GET /privacy
pub async fn serve_privacy() -> Html<&'static str> {
    Html(PRIVACY_HTML)
}

/// GET /terms
pub async fn serve_terms() -> Html<&'static str> {
    Html(TERMS_HTML)
}

/// GET /planning
pub async fn serve_planning() -> Html<&'static str> {
    Html(PLANNING_HTML)
}

/// GET /tracker
pub async fn serve_tracker() -> Html<&'static str> {
    Html(TRACKER_HTML)
}

/// GET /login
pub async fn serve_login() -> Html<&'static str> {
    Html(LOGIN_HTML)
}

/// GET /register
pub async fn serve_register() -> Html<&'static str> {
    Html(REGISTER_HTML)
}

/// GET /dashboard (behind require_login)
pub async fn serve_dashboard() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

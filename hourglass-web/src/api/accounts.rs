//! User accounts: registration, login/logout, and session resolution
//!
//! Every request passes through [`resolve_user`], which turns the session
//! cookie into a [`CurrentUser`] extension (falling back to the built-in
//! Anonymous user). The dashboard additionally passes [`require_login`].

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use hourglass_common::db::init::{setting_i64, ANONYMOUS_USER_GUID};
use hourglass_common::time;
use serde::Deserialize;
use tracing::warn;

use crate::api::error::ApiError;
use crate::store;
use crate::AppState;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "hourglass_session";

/// Fallback session lifetime when the setting is unreadable
const DEFAULT_SESSION_TIMEOUT_SECS: i64 = 2_592_000; // 30 days

/// The user a request is acting as
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub guid: String,
    pub username: String,
    pub logged_in: bool,
}

impl CurrentUser {
    fn anonymous() -> Self {
        Self {
            guid: ANONYMOUS_USER_GUID.to_string(),
            username: "Anonymous".to_string(),
            logged_in: false,
        }
    }
}

/// Login / registration form fields
#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    pub username: String,
    pub password: String,
}

/// Middleware: resolve the session cookie to a `CurrentUser` extension
///
/// Never rejects a request: an invalid or expired session simply degrades
/// to Anonymous.
pub async fn resolve_user(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let jar = CookieJar::from_headers(request.headers());

    let mut user = CurrentUser::anonymous();
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        match store::users::session_user(&state.db, cookie.value(), time::now()).await {
            Ok(Some(account)) => {
                user = CurrentUser {
                    guid: account.guid,
                    username: account.username,
                    logged_in: true,
                };
            }
            Ok(None) => {}
            Err(e) => warn!("Session lookup failed, treating as anonymous: {}", e),
        }
    }

    request.extensions_mut().insert(user);
    next.run(request).await
}

/// Middleware: redirect anonymous requests to the login page
///
/// Must run inside `resolve_user`.
pub async fn require_login(request: Request, next: Next) -> Response {
    let logged_in = request
        .extensions()
        .get::<CurrentUser>()
        .map(|u| u.logged_in)
        .unwrap_or(false);

    if !logged_in {
        return Redirect::to("/login").into_response();
    }
    next.run(request).await
}

/// POST /register
///
/// Creates the account and logs it in immediately.
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<CredentialsForm>,
) -> Result<impl IntoResponse, ApiError> {
    let user = store::users::create_user(&state.db, &form.username, &form.password).await?;
    let jar = start_session(&state, jar, &user.guid).await?;
    Ok((jar, Redirect::to("/dashboard")))
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<CredentialsForm>,
) -> Result<impl IntoResponse, ApiError> {
    let user = store::users::authenticate(&state.db, &form.username, &form.password).await?;
    let jar = start_session(&state, jar, &user.guid).await?;
    Ok((jar, Redirect::to("/dashboard")))
}

/// POST /logout
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        store::users::delete_session(&state.db, cookie.value()).await?;
    }
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/").build());
    Ok((jar, Redirect::to("/")))
}

async fn start_session(
    state: &AppState,
    jar: CookieJar,
    user_guid: &str,
) -> Result<CookieJar, ApiError> {
    let timeout = setting_i64(
        &state.db,
        "session_timeout_seconds",
        DEFAULT_SESSION_TIMEOUT_SECS,
    )
    .await?;

    let session = store::users::create_session(&state.db, user_guid, time::now(), timeout).await?;

    let cookie = Cookie::build((SESSION_COOKIE, session.token))
        .path("/")
        .http_only(true)
        .build();
    Ok(jar.add(cookie))
}

//! User accounts and login sessions

use chrono::{DateTime, Duration, Utc};
use hourglass_common::auth::{generate_salt, hash_password, verify_password};
use hourglass_common::db::models::{Session, User};
use hourglass_common::{Error, Result};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

/// Minimum password length accepted at registration
const MIN_PASSWORD_LEN: usize = 8;

fn validate_username(username: &str) -> Result<()> {
    let ok = (3..=32).contains(&username.len())
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !ok {
        return Err(Error::InvalidInput(
            "Username must be 3-32 characters (letters, digits, underscore)".to_string(),
        ));
    }
    Ok(())
}

/// Register a new user account
pub async fn create_user(db: &SqlitePool, username: &str, password: &str) -> Result<User> {
    let username = username.trim();
    validate_username(username)?;
    if password.len() < MIN_PASSWORD_LEN {
        return Err(Error::InvalidInput(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let taken: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = ?)")
        .bind(username)
        .fetch_one(db)
        .await?;
    if taken {
        return Err(Error::InvalidInput(
            "Username is already taken".to_string(),
        ));
    }

    let guid = Uuid::new_v4().to_string();
    let salt = generate_salt();
    let hash = hash_password(&salt, password);

    sqlx::query(
        "INSERT INTO users (guid, username, password_hash, password_salt) VALUES (?, ?, ?, ?)",
    )
    .bind(&guid)
    .bind(username)
    .bind(&hash)
    .bind(&salt)
    .execute(db)
    .await?;

    info!("Registered user '{}'", username);

    Ok(User {
        guid,
        username: username.to_string(),
        password_hash: hash,
        password_salt: salt,
    })
}

/// Verify a username/password pair
///
/// The same error covers unknown usernames and wrong passwords, so the
/// response does not reveal which accounts exist.
pub async fn authenticate(db: &SqlitePool, username: &str, password: &str) -> Result<User> {
    let row: Option<(String, String, String, String)> = sqlx::query_as(
        "SELECT guid, username, password_hash, password_salt FROM users WHERE username = ?",
    )
    .bind(username.trim())
    .fetch_optional(db)
    .await?;

    let invalid = || Error::InvalidInput("Invalid username or password".to_string());

    let (guid, username, password_hash, password_salt) = row.ok_or_else(invalid)?;

    // The Anonymous user has no password and cannot be logged into
    if password_hash.is_empty() || !verify_password(&password_salt, &password_hash, password) {
        return Err(invalid());
    }

    Ok(User {
        guid,
        username,
        password_hash,
        password_salt,
    })
}

/// Create a login session for a user
pub async fn create_session(
    db: &SqlitePool,
    user_guid: &str,
    now: DateTime<Utc>,
    timeout_seconds: i64,
) -> Result<Session> {
    let token = Uuid::new_v4().to_string();
    let expires_at = now + Duration::seconds(timeout_seconds);

    sqlx::query(
        "INSERT INTO sessions (token, user_guid, created_at, expires_at) VALUES (?, ?, ?, ?)",
    )
    .bind(&token)
    .bind(user_guid)
    .bind(now.to_rfc3339())
    .bind(expires_at.to_rfc3339())
    .execute(db)
    .await?;

    Ok(Session {
        token,
        user_guid: user_guid.to_string(),
        expires_at,
    })
}

/// Delete a session (logout); unknown tokens are a no-op
pub async fn delete_session(db: &SqlitePool, token: &str) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(db)
        .await?;
    Ok(())
}

/// Resolve a session token to its user, if the session is still valid
pub async fn session_user(
    db: &SqlitePool,
    token: &str,
    now: DateTime<Utc>,
) -> Result<Option<User>> {
    let row: Option<(String, String, String, String, String)> = sqlx::query_as(
        r#"
        SELECT u.guid, u.username, u.password_hash, u.password_salt, s.expires_at
        FROM sessions s JOIN users u ON u.guid = s.user_guid
        WHERE s.token = ?
        "#,
    )
    .bind(token)
    .fetch_optional(db)
    .await?;

    let Some((guid, username, password_hash, password_salt, expires_raw)) = row else {
        return Ok(None);
    };

    let expires_at = super::parse_timestamp(&expires_raw)?;
    if expires_at <= now {
        // Expired sessions are reaped lazily
        delete_session(db, token).await?;
        return Ok(None);
    }

    Ok(Some(User {
        guid,
        username,
        password_hash,
        password_salt,
    }))
}

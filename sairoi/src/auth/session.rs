//! Database-backed login sessions and the cookie that carries them.
//!
//! The browser holds an opaque random token; the database holds only its SHA-256 digest. Expired
//! sessions are removed lazily, by whichever request first finds them.

use axum::http::{HeaderMap, header};
use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::{debug, instrument};

use crate::api::models::users::CurrentUser;
use crate::auth::password::{generate_session_token, token_digest};
use crate::config::SessionConfig;
use crate::db::handlers::{Repository, Sessions, Users};
use crate::db::models::sessions::SessionCreateDBRequest;
use crate::errors::{Error, Result};
use crate::types::{UserId, abbrev_uuid};

/// Create a session for `user_id` and return the raw token for the cookie.
#[instrument(skip(conn, config), fields(user_id = %abbrev_uuid(&user_id)), err)]
pub async fn start_session(conn: &mut SqliteConnection, user_id: UserId, config: &SessionConfig) -> Result<String> {
    let token = generate_session_token();
    let timeout = chrono::Duration::from_std(config.timeout).map_err(|e| Error::Internal {
        operation: format!("convert session timeout: {e}"),
    })?;

    Sessions::new(conn)
        .create(&SessionCreateDBRequest {
            user_id,
            token_hash: token_digest(&token),
            expires_at: Utc::now() + timeout,
        })
        .await?;

    Ok(token)
}

/// Resolve a raw token to the identity it belongs to.
///
/// Unknown tokens resolve to `None`. Expired ones are deleted and also resolve to `None`; the
/// delete tolerates a concurrent request having removed the row first.
#[instrument(skip_all, err)]
pub async fn resolve_session(conn: &mut SqliteConnection, token: &str, now: DateTime<Utc>) -> Result<Option<CurrentUser>> {
    let token_hash = token_digest(token);

    let Some(session) = Sessions::new(&mut *conn).get_by_token_hash(&token_hash).await? else {
        return Ok(None);
    };

    if session.is_expired(now) {
        let removed = Sessions::new(&mut *conn).delete_by_token_hash(&token_hash).await?;
        debug!(user_id = %abbrev_uuid(&session.user_id), removed, "Session expired");
        return Ok(None);
    }

    let user = Users::new(&mut *conn).get_by_id(session.user_id).await?;
    Ok(user.map(CurrentUser::from))
}

/// Delete the session behind a raw token. Returns whether a row was removed.
#[instrument(skip_all, err)]
pub async fn end_session(conn: &mut SqliteConnection, token: &str) -> Result<bool> {
    Ok(Sessions::new(conn).delete_by_token_hash(&token_digest(token)).await?)
}

/// Read the session token from the request's `Cookie` header, if present.
pub fn session_token_from_headers<'h>(headers: &'h HeaderMap, cookie_name: &str) -> Option<&'h str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|cookie| cookie.trim().split_once('='))
        .find(|(name, value)| *name == cookie_name && !value.is_empty())
        .map(|(_, value)| value)
}

fn same_site_attribute(value: &str) -> &'static str {
    match value.to_ascii_lowercase().as_str() {
        "strict" => "Strict",
        "none" => "None",
        _ => "Lax",
    }
}

fn build_cookie(value: &str, max_age: u64, config: &SessionConfig) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite={}; Max-Age={}",
        config.cookie_name,
        value,
        same_site_attribute(&config.cookie_same_site),
        max_age
    );
    if config.cookie_secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value carrying a freshly issued token.
pub fn session_cookie(token: &str, config: &SessionConfig) -> String {
    build_cookie(token, config.timeout.as_secs(), config)
}

/// `Set-Cookie` value that makes the browser drop the session cookie.
pub fn clear_session_cookie(config: &SessionConfig) -> String {
    build_cookie("", 0, config)
}

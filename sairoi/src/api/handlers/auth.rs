use axum::{
    Form, Json,
    extract::{Query, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use tracing::{debug, info};

use crate::{
    AppState,
    api::models::{
        auth::{LoginForm, LoginQuery, LoginView, SessionRedirect},
        non_blank,
        users::normalize_email,
    },
    auth::{
        password,
        session::{clear_session_cookie, end_session, session_cookie, session_token_from_headers, start_session},
    },
    db::{errors::DbError, handlers::Users},
    errors::Error,
    types::abbrev_uuid,
};

const LOGIN_FAILED: &str = "/login?error=Invalid%20email%20or%20password.";

/// Login page view model
#[utoipa::path(
    get,
    path = "/login",
    tag = "authentication",
    params(LoginQuery),
    responses(
        (status = 200, description = "Login page", body = LoginView),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login_page(Query(query): Query<LoginQuery>) -> Json<LoginView> {
    Json(LoginView { error: query.error })
}

/// Sign in with email and password
#[utoipa::path(
    post,
    path = "/login",
    tag = "authentication",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Signed in; session cookie set and redirected to /dashboard, or redirected back to /login with an error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Result<Response, Error> {
    let (Some(email), Some(password)) = (non_blank(form.email.as_deref()), form.password.filter(|p| !p.is_empty())) else {
        debug!("Login form incomplete");
        return Ok(Redirect::to(LOGIN_FAILED).into_response());
    };
    let email = normalize_email(email);

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let Some(user) = Users::new(&mut conn).get_user_by_email(&email).await? else {
        debug!("Login for unknown email");
        return Ok(Redirect::to(LOGIN_FAILED).into_response());
    };

    // Verify password on a blocking thread to avoid blocking async runtime
    let hash = user.password_hash.clone();
    let is_valid = tokio::task::spawn_blocking(move || password::verify_string(&password, &hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password verification task: {e}"),
        })??;

    if !is_valid {
        debug!(user_id = %abbrev_uuid(&user.id), "Login with wrong password");
        return Ok(Redirect::to(LOGIN_FAILED).into_response());
    }

    let token = start_session(&mut conn, user.id, &state.config.auth.session).await?;
    info!(user_id = %abbrev_uuid(&user.id), "User signed in");

    Ok(SessionRedirect {
        location: "/dashboard",
        cookie: session_cookie(&token, &state.config.auth.session),
    }
    .into_response())
}

/// Sign out and clear the session cookie
#[utoipa::path(
    post,
    path = "/logout",
    tag = "authentication",
    responses(
        (status = 303, description = "Session removed, cookie cleared, redirected to /login"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<SessionRedirect, Error> {
    let session_config = &state.config.auth.session;

    if let Some(token) = session_token_from_headers(&headers, &session_config.cookie_name) {
        let mut conn = state.db.acquire().await.map_err(DbError::from)?;
        let removed = end_session(&mut conn, token).await?;
        debug!(removed, "Session ended");
    }

    Ok(SessionRedirect {
        location: "/login",
        cookie: clear_session_cookie(session_config),
    })
}

#[tracing::instrument(skip_all)]
pub async fn root() -> Redirect {
    Redirect::to("/dashboard")
}

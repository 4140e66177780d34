//! Extractor resolving the session cookie to the signed-in user.

use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::Utc;
use tracing::{instrument, trace};

use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::session::{resolve_session, session_token_from_headers},
    db::errors::DbError,
    errors::{Error, Result},
};

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let cookie_name = &state.config.auth.session.cookie_name;
        let Some(token) = session_token_from_headers(&parts.headers, cookie_name) else {
            trace!("No session cookie present");
            return Err(Error::Unauthenticated { message: None });
        };

        let mut conn = state.db.acquire().await.map_err(DbError::from)?;
        match resolve_session(&mut conn, token, Utc::now()).await? {
            Some(user) => Ok(user),
            None => {
                trace!("Session cookie did not resolve to a live session");
                Err(Error::Unauthenticated { message: None })
            }
        }
    }
}

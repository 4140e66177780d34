//! Login form and view models.

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Credentials as submitted by the login form
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct LoginForm {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct LoginQuery {
    /// Message from a failed attempt, echoed back to the form
    pub error: Option<String>,
}

/// What the login page needs to render
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginView {
    pub error: Option<String>,
}

/// A `303 See Other` that also sets (or clears) the session cookie.
#[derive(Debug, Clone)]
pub struct SessionRedirect {
    pub location: &'static str,
    pub cookie: String,
}

impl IntoResponse for SessionRedirect {
    fn into_response(self) -> Response {
        (
            StatusCode::SEE_OTHER,
            [(header::LOCATION, self.location.to_string()), (header::SET_COOKIE, self.cookie)],
        )
            .into_response()
    }
}

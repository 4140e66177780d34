//! OpenAPI document for the dashboard, served at `/openapi.json` and rendered at `/docs`.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};

use crate::api::{handlers, models};

/// Session cookie security scheme.
struct SessionCookieAddon;

impl Modify for SessionCookieAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "session_cookie".to_string(),
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "sairoi_session",
                    "Opaque session token set by `POST /login`. The cookie name follows `auth.session.cookie_name`.",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Support AI ROI",
        description = "Log AI-assisted support work and report the time and money it saves, scoped to the viewer's role.",
    ),
    paths(
        handlers::auth::login_page,
        handlers::auth::login,
        handlers::auth::logout,
        handlers::dashboard::get_dashboard,
        handlers::events::get_log_form,
        handlers::events::create_event,
        handlers::reports::export_report,
        handlers::admin::get_admin_overview,
        handlers::admin::create_team,
        handlers::admin::create_user,
        handlers::admin::set_tool_approval,
        handlers::admin::set_rate,
        handlers::admin::update_category,
    ),
    components(schemas(
        models::auth::LoginForm,
        models::auth::LoginView,
        models::users::Role,
        models::users::CurrentUser,
        models::users::UserResponse,
        models::teams::TeamResponse,
        models::categories::CategoryResponse,
        models::events::Tool,
        models::events::TimeSavedBucket,
        models::events::ReworkLevel,
        models::events::Outcome,
        models::events::EventCreateForm,
        models::events::ToolOption,
        models::events::BucketOption,
        models::events::LogFormResponse,
        models::events::EventResponse,
        models::dashboard::DashboardMetrics,
        models::dashboard::CategoryRollupResponse,
        models::dashboard::DashboardResponse,
        models::admin::AdminOverview,
        models::admin::TeamCreateForm,
        models::admin::UserCreateForm,
        models::admin::ToolApprovalForm,
        models::admin::RateForm,
        models::admin::CategoryUpdateForm,
    )),
    modifiers(&SessionCookieAddon),
    tags(
        (name = "authentication", description = "Sign in and out"),
        (name = "dashboard", description = "Scoped ROI metrics"),
        (name = "events", description = "Log AI-assisted work"),
        (name = "reports", description = "CSV export"),
        (name = "admin", description = "Teams, users, tools, rate and categories"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();
        for expected in [
            "/login",
            "/logout",
            "/dashboard",
            "/log",
            "/api/report",
            "/admin",
            "/admin/teams",
            "/admin/users",
            "/admin/tools",
            "/admin/rate",
            "/admin/categories",
        ] {
            assert!(paths.contains(&expected), "missing {expected}");
        }

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("session_cookie"));
    }
}

//! Admin console. Every mutation here is admin-only and answers with a redirect to `/admin`,
//! whether or not the change was applied; failures are logged instead of shown.

use axum::{Form, Json, extract::State, response::Redirect};
use tracing::{debug, info, warn};

use crate::{
    AppState,
    api::{
        handlers::events::tool_options,
        models::{
            WireCode,
            admin::{AdminOverview, CategoryUpdateForm, RateForm, TeamCreateForm, ToolApprovalForm, UserCreateForm},
            categories::CategoryResponse,
            events::Tool,
            non_blank,
            teams::TeamResponse,
            users::{CurrentUser, Role, UserResponse, normalize_email},
        },
    },
    auth::{
        password,
        permissions::{ADMIN_ONLY, require_role},
    },
    db::{
        errors::DbError,
        handlers::{ApprovedTools, Categories, Repository, Settings, Teams, Users, users::UserFilter},
        models::{
            categories::CategoryFilter, settings::BLENDED_HOURLY_RATE_KEY, teams::TeamCreateDBRequest,
            users::UserCreateDBRequest,
        },
    },
    errors::Error,
    types::{Operation, Resource, abbrev_uuid},
};

const ADMIN_VIEW: &str = "/admin";

/// Users listed on the admin overview.
const RECENT_USERS: i64 = 50;

/// Log a failed admin change; the caller still redirects.
fn log_outcome(action: &str, result: Result<(), Error>) {
    if let Err(e) = result {
        warn!(action, reason = %e, "Admin change not applied");
    }
}

/// Admin overview: teams, users, categories, tools and the hourly rate
#[utoipa::path(
    get,
    path = "/admin",
    tag = "admin",
    responses(
        (status = 200, description = "Admin view model", body = AdminOverview),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "Not an admin"),
    ),
    security(("session_cookie" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn get_admin_overview(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<AdminOverview>, Error> {
    require_role(&current_user, ADMIN_ONLY, Operation::Read, Resource::Admin)?;

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let teams = Teams::new(&mut conn).list(&()).await?;
    let users = Users::new(&mut conn).list(&UserFilter::new(RECENT_USERS)).await?;
    let categories = Categories::new(&mut conn).list(&CategoryFilter::default()).await?;
    let tools = tool_options(&mut ApprovedTools::new(&mut conn)).await?;
    let blended_hourly_rate = Settings::new(&mut conn).blended_hourly_rate().await?;

    Ok(Json(AdminOverview {
        teams: teams.into_iter().map(TeamResponse::from).collect(),
        users: users.into_iter().map(UserResponse::from).collect(),
        categories: categories.into_iter().map(CategoryResponse::from).collect(),
        tools,
        blended_hourly_rate,
    }))
}

async fn apply_team_create(state: &AppState, form: TeamCreateForm) -> Result<(), Error> {
    let Some(name) = non_blank(form.name.as_deref()) else {
        debug!("Blank team name ignored");
        return Ok(());
    };

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let team = Teams::new(&mut conn)
        .create(&TeamCreateDBRequest { name: name.to_string() })
        .await?;
    info!(team_id = %abbrev_uuid(&team.id), name = %team.name, "Team created");
    Ok(())
}

/// Create a team
#[utoipa::path(
    post,
    path = "/admin/teams",
    tag = "admin",
    request_body(content = TeamCreateForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Redirected to /admin"),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "Not an admin"),
    ),
    security(("session_cookie" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn create_team(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Form(form): Form<TeamCreateForm>,
) -> Result<Redirect, Error> {
    require_role(&current_user, ADMIN_ONLY, Operation::Create, Resource::Teams)?;

    log_outcome("create team", apply_team_create(&state, form).await);
    Ok(Redirect::to(ADMIN_VIEW))
}

async fn apply_user_create(state: &AppState, form: UserCreateForm) -> Result<(), Error> {
    let email = non_blank(form.email.as_deref())
        .map(normalize_email)
        .ok_or_else(|| Error::BadRequest {
            message: "Email is required".to_string(),
        })?;

    let password = form.password.unwrap_or_default();
    let password_config = &state.config.auth.password;
    let length = password.chars().count();
    if length < password_config.min_length || length > password_config.max_length {
        return Err(Error::BadRequest {
            message: format!(
                "Password must be between {} and {} characters",
                password_config.min_length, password_config.max_length
            ),
        });
    }

    let role = match non_blank(form.role.as_deref()) {
        None => Role::User,
        Some(code) => Role::from_code(code).ok_or_else(|| Error::BadRequest {
            message: format!("Invalid role: {code}"),
        })?,
    };

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;

    let team_id = match non_blank(form.team_id.as_deref()) {
        None => None,
        Some(raw) => {
            let id = uuid::Uuid::parse_str(raw).map_err(|_| Error::BadRequest {
                message: format!("Invalid team id: {raw}"),
            })?;
            let team = Teams::new(&mut conn).get_by_id(id).await?.ok_or_else(|| Error::NotFound {
                resource: "Team".to_string(),
                id: raw.to_string(),
            })?;
            Some(team.id)
        }
    };

    // Hash the password on a blocking thread to avoid blocking async runtime
    let params = password_config.argon2_params();
    let password_hash = tokio::task::spawn_blocking(move || password::hash_string_with_params(&password, params))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password hashing task: {e}"),
        })??;

    let user = Users::new(&mut conn)
        .create(&UserCreateDBRequest {
            email,
            password_hash,
            role,
            team_id,
        })
        .await?;
    info!(user_id = %abbrev_uuid(&user.id), role = ?user.role, "User created");

    Ok(())
}

/// Create a user
#[utoipa::path(
    post,
    path = "/admin/users",
    tag = "admin",
    request_body(content = UserCreateForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Redirected to /admin"),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "Not an admin"),
    ),
    security(("session_cookie" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn create_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Form(form): Form<UserCreateForm>,
) -> Result<Redirect, Error> {
    require_role(&current_user, ADMIN_ONLY, Operation::Create, Resource::Users)?;

    log_outcome("create user", apply_user_create(&state, form).await);
    Ok(Redirect::to(ADMIN_VIEW))
}

async fn apply_tool_approval(state: &AppState, form: ToolApprovalForm) -> Result<(), Error> {
    let code = non_blank(form.tool.as_deref()).unwrap_or_default();
    let tool = Tool::from_code(code).ok_or_else(|| Error::BadRequest {
        message: format!("Invalid tool: {code}"),
    })?;
    let approved = form.is_approved();

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    ApprovedTools::new(&mut conn).set_approved(tool, approved).await?;
    info!(tool = tool.code(), approved, "Tool approval updated");
    Ok(())
}

/// Approve or revoke a tool
#[utoipa::path(
    post,
    path = "/admin/tools",
    tag = "admin",
    request_body(content = ToolApprovalForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Redirected to /admin"),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "Not an admin"),
    ),
    security(("session_cookie" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn set_tool_approval(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Form(form): Form<ToolApprovalForm>,
) -> Result<Redirect, Error> {
    require_role(&current_user, ADMIN_ONLY, Operation::Update, Resource::Tools)?;

    log_outcome("update tool approval", apply_tool_approval(&state, form).await);
    Ok(Redirect::to(ADMIN_VIEW))
}

async fn apply_rate(state: &AppState, form: RateForm) -> Result<(), Error> {
    let Some(rate) = form.parsed_rate() else {
        return Err(Error::BadRequest {
            message: format!("Unusable rate {:?}; keeping previous value", form.rate.as_deref().unwrap_or_default()),
        });
    };

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    Settings::new(&mut conn).set(BLENDED_HOURLY_RATE_KEY, &rate.to_string()).await?;
    info!(rate, "Blended hourly rate updated");
    Ok(())
}

/// Set the blended hourly rate
#[utoipa::path(
    post,
    path = "/admin/rate",
    tag = "admin",
    request_body(content = RateForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Redirected to /admin; a non-numeric, negative or non-finite rate keeps the previous value"),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "Not an admin"),
    ),
    security(("session_cookie" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn set_rate(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Form(form): Form<RateForm>,
) -> Result<Redirect, Error> {
    require_role(&current_user, ADMIN_ONLY, Operation::Update, Resource::Settings)?;

    log_outcome("update hourly rate", apply_rate(&state, form).await);
    Ok(Redirect::to(ADMIN_VIEW))
}

async fn apply_category_update(state: &AppState, form: CategoryUpdateForm) -> Result<(), Error> {
    let Some(category_id) = form.category_id() else {
        debug!("Category update without a usable id ignored");
        return Ok(());
    };

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    match Categories::new(&mut conn).update(category_id, &form.to_update()).await? {
        Some(category) => info!(
            category_id = %abbrev_uuid(&category.id),
            low = category.default_minutes_low,
            high = category.default_minutes_high,
            active = category.active,
            "Category updated"
        ),
        None => debug!(category_id = %abbrev_uuid(&category_id), "Update for unknown category ignored"),
    }
    Ok(())
}

/// Adjust a category's default range or toggle whether it is offered
#[utoipa::path(
    post,
    path = "/admin/categories",
    tag = "admin",
    request_body(content = CategoryUpdateForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Redirected to /admin; unusable numbers keep their previous values"),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "Not an admin"),
    ),
    security(("session_cookie" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn update_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Form(form): Form<CategoryUpdateForm>,
) -> Result<Redirect, Error> {
    require_role(&current_user, ADMIN_ONLY, Operation::Update, Resource::Categories)?;

    log_outcome("update category", apply_category_update(&state, form).await);
    Ok(Redirect::to(ADMIN_VIEW))
}

#[cfg(test)]
mod tests {
    use crate::api::models::admin::AdminOverview;
    use crate::api::models::events::Tool;
    use crate::api::models::users::Role;
    use crate::db::handlers::{ApprovedTools, Categories, Repository, Settings, Users};
    use crate::db::models::settings::BLENDED_HOURLY_RATE_KEY;
    use crate::test_utils::{TEST_PASSWORD, create_test_app, create_test_category, create_test_team, create_test_user, login_cookie};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use sqlx::SqlitePool;

    async fn admin_session(pool: &SqlitePool, state: &crate::AppState) -> String {
        let admin = create_test_user(pool, "admin@example.com", Role::Admin, None).await;
        login_cookie(state, admin.id).await
    }

    async fn post_admin(server: &TestServer, cookie: &str, path: &str, fields: &[(&str, &str)]) {
        let response = server.post(path).add_header("cookie", cookie).form(&fields).await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), "/admin");
    }

    async fn current_rate(pool: &SqlitePool) -> f64 {
        let mut conn = pool.acquire().await.unwrap();
        Settings::new(&mut conn).blended_hourly_rate().await.unwrap()
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_non_admins_are_forbidden(pool: SqlitePool) {
        let (server, state) = create_test_app(pool.clone()).await;
        let team = create_test_team(&pool, "Billing").await;
        let manager = create_test_user(&pool, "manager@example.com", Role::Manager, Some(team.id)).await;
        let cookie = login_cookie(&state, manager.id).await;

        server
            .get("/admin")
            .add_header("cookie", cookie.clone())
            .await
            .assert_status(StatusCode::FORBIDDEN);

        let response = server
            .post("/admin/rate")
            .add_header("cookie", cookie.clone())
            .form(&[("rate", "99")])
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
        assert_eq!(current_rate(&pool).await, 20.0);

        server
            .post("/admin/teams")
            .form(&[("name", "Sneaky")])
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_admin_overview(pool: SqlitePool) {
        let (server, state) = create_test_app(pool.clone()).await;
        let cookie = admin_session(&pool, &state).await;
        {
            let mut conn = pool.acquire().await.unwrap();
            ApprovedTools::new(&mut conn).set_approved(Tool::Copilot, false).await.unwrap();
        }

        let body: AdminOverview = server.get("/admin").add_header("cookie", cookie).await.json();
        assert!(body.teams.iter().any(|t| t.name == "Support"));
        assert_eq!(body.users.len(), 1);
        assert_eq!(body.categories.len(), 20);
        assert_eq!(body.tools.len(), 5);
        assert!(!body.tools.iter().find(|t| t.tool == Tool::Copilot).unwrap().approved);
        assert_eq!(body.blended_hourly_rate, 20.0);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_team_and_duplicates(pool: SqlitePool) {
        let (server, state) = create_test_app(pool.clone()).await;
        let cookie = admin_session(&pool, &state).await;

        post_admin(&server, &cookie, "/admin/teams", &[("name", "  Billing  ")]).await;
        post_admin(&server, &cookie, "/admin/teams", &[("name", "Billing")]).await;
        post_admin(&server, &cookie, "/admin/teams", &[("name", "   ")]).await;

        let body: AdminOverview = server.get("/admin").add_header("cookie", cookie).await.json();
        let names: Vec<&str> = body.teams.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Billing", "Support"]);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_user(pool: SqlitePool) {
        let (server, state) = create_test_app(pool.clone()).await;
        let cookie = admin_session(&pool, &state).await;
        let team = create_test_team(&pool, "Billing").await;
        let team_id = team.id.to_string();

        post_admin(
            &server,
            &cookie,
            "/admin/users",
            &[
                ("email", " New.Agent@Example.com "),
                ("password", TEST_PASSWORD),
                ("role", "MANAGER"),
                ("teamId", &team_id),
            ],
        )
        .await;

        let mut conn = pool.acquire().await.unwrap();
        let created = Users::new(&mut conn)
            .get_user_by_email("new.agent@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(created.email, "new.agent@example.com");
        assert_eq!(created.role, Role::Manager);
        assert_eq!(created.team_id, Some(team.id));
        assert!(crate::auth::password::verify_string(TEST_PASSWORD, &created.password_hash).unwrap());
        drop(conn);

        // New user can sign in
        let response = server
            .post("/login")
            .form(&[("email", "new.agent@example.com"), ("password", TEST_PASSWORD)])
            .await;
        assert_eq!(response.header("location"), "/dashboard");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_user_rejections_write_nothing(pool: SqlitePool) {
        let (server, state) = create_test_app(pool.clone()).await;
        let cookie = admin_session(&pool, &state).await;

        let attempts: Vec<Vec<(&str, &str)>> = vec![
            vec![("email", "a@example.com"), ("password", "short")],
            vec![("email", "b@example.com"), ("password", TEST_PASSWORD), ("role", "OWNER")],
            vec![("email", "c@example.com"), ("password", TEST_PASSWORD), ("teamId", "not-a-uuid")],
            vec![
                ("email", "d@example.com"),
                ("password", TEST_PASSWORD),
                ("teamId", "550e8400-e29b-41d4-a716-446655440000"),
            ],
            vec![("email", "ADMIN@example.com"), ("password", TEST_PASSWORD)],
            vec![("email", "  "), ("password", TEST_PASSWORD)],
        ];
        for fields in &attempts {
            post_admin(&server, &cookie, "/admin/users", fields).await;
        }

        let body: AdminOverview = server.get("/admin").add_header("cookie", cookie).await.json();
        assert_eq!(body.users.len(), 1);
        assert_eq!(body.users[0].email, "admin@example.com");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_default_role_is_user(pool: SqlitePool) {
        let (server, state) = create_test_app(pool.clone()).await;
        let cookie = admin_session(&pool, &state).await;

        post_admin(
            &server,
            &cookie,
            "/admin/users",
            &[("email", "plain@example.com"), ("password", TEST_PASSWORD), ("teamId", "")],
        )
        .await;

        let mut conn = pool.acquire().await.unwrap();
        let created = Users::new(&mut conn).get_user_by_email("plain@example.com").await.unwrap().unwrap();
        assert_eq!(created.role, Role::User);
        assert_eq!(created.team_id, None);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_tool_approval(pool: SqlitePool) {
        let (server, state) = create_test_app(pool.clone()).await;
        let cookie = admin_session(&pool, &state).await;

        post_admin(&server, &cookie, "/admin/tools", &[("tool", "GEMINI"), ("approved", "0")]).await;
        post_admin(&server, &cookie, "/admin/tools", &[("tool", "BARD"), ("approved", "1")]).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut tools = ApprovedTools::new(&mut conn);
        assert!(!tools.is_approved(Tool::Gemini).await.unwrap());
        assert!(tools.is_approved(Tool::Claude).await.unwrap());
        drop(tools);
        drop(conn);

        post_admin(&server, &cookie, "/admin/tools", &[("tool", "GEMINI"), ("approved", "1")]).await;
        let mut conn = pool.acquire().await.unwrap();
        assert!(ApprovedTools::new(&mut conn).is_approved(Tool::Gemini).await.unwrap());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_tool_approval_without_flag_approves(pool: SqlitePool) {
        let (server, state) = create_test_app(pool.clone()).await;
        let cookie = admin_session(&pool, &state).await;

        post_admin(&server, &cookie, "/admin/tools", &[("tool", "COPILOT"), ("approved", "0")]).await;
        post_admin(&server, &cookie, "/admin/tools", &[("tool", "COPILOT")]).await;

        let mut conn = pool.acquire().await.unwrap();
        assert!(ApprovedTools::new(&mut conn).is_approved(Tool::Copilot).await.unwrap());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_rate_update_keeps_previous_on_bad_input(pool: SqlitePool) {
        let (server, state) = create_test_app(pool.clone()).await;
        let cookie = admin_session(&pool, &state).await;

        post_admin(&server, &cookie, "/admin/rate", &[("rate", "32.5")]).await;
        assert_eq!(current_rate(&pool).await, 32.5);

        for bad in ["abc", "NaN", "inf", "-4", ""] {
            post_admin(&server, &cookie, "/admin/rate", &[("rate", bad)]).await;
            assert_eq!(current_rate(&pool).await, 32.5, "rate changed by {bad:?}");
        }

        let mut conn = pool.acquire().await.unwrap();
        let stored = Settings::new(&mut conn).get(BLENDED_HOURLY_RATE_KEY).await.unwrap().unwrap();
        assert_eq!(stored.value, "32.5");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_category_update(pool: SqlitePool) {
        let (server, state) = create_test_app(pool.clone()).await;
        let cookie = admin_session(&pool, &state).await;
        let category = create_test_category(&pool, "Admin edit").await;
        let id = category.id.to_string();

        post_admin(&server, &cookie, "/admin/categories", &[("id", &id), ("low", "7"), ("high", "oops")]).await;
        post_admin(&server, &cookie, "/admin/categories", &[("id", &id), ("toggleActive", "1")]).await;
        // Unknown and missing ids are no-ops
        post_admin(
            &server,
            &cookie,
            "/admin/categories",
            &[("id", "550e8400-e29b-41d4-a716-446655440000"), ("low", "1")],
        )
        .await;
        post_admin(&server, &cookie, "/admin/categories", &[("low", "1")]).await;

        let mut conn = pool.acquire().await.unwrap();
        let updated = Categories::new(&mut conn).get_by_id(category.id).await.unwrap().unwrap();
        assert_eq!(updated.default_minutes_low, 7);
        assert_eq!(updated.default_minutes_high, category.default_minutes_high);
        assert!(!updated.active);
    }
}

//! # sairoi: Support AI ROI
//!
//! `sairoi` is a small multi-tenant service for support teams that want to know what their AI
//! assistants are actually worth. Agents log each AI-assisted piece of work (which tool, which kind
//! of task, roughly how much time it saved, how much rework it needed and whether any sensitive
//! data was involved). Managers and admins get the rollup: sessions, weekly active users, adoption,
//! conservative hours saved, their estimated value at a blended hourly rate, rework rate and risk
//! flags, plus a CSV export of the same window.
//!
//! ## Architecture
//!
//! The HTTP layer is [Axum](https://github.com/tokio-rs/axum); persistence is a single SQLite
//! database accessed through `sqlx`. Pages are served as JSON view models so that any template
//! layer or SPA can render them.
//!
//! ### Request Flow
//!
//! A browser signs in at `/login` and receives an opaque session cookie. Every other route resolves
//! that cookie to a [`CurrentUser`](api::models::users::CurrentUser) in an extractor, then
//! derives the viewer's [`Scope`](auth::scope::Scope) from their role:
//!
//! - `ADMIN` sees everything, and is the only role allowed into `/admin`
//! - `USER` and `MANAGER` see every event logged by their team
//! - anyone without a team sees only their own events
//!
//! Handlers talk to the database through the repositories in [`db::handlers`]. The dashboard and
//! the CSV export both feed the scoped events through [`metrics::roi::summarize`], so the two
//! always agree.
//!
//! ### Startup
//!
//! [`Application::new`] opens (and if needed creates) the database file, runs migrations, seeds
//! the default team, category catalog, tool approvals and hourly rate without overwriting existing
//! rows, and creates or updates the initial admin account.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod export;
pub mod metrics;
mod openapi;
pub mod telemetry;
pub mod types;

#[cfg(test)]
pub mod test_utils;

use crate::{
    api::models::{WireCode, events::Tool, users::Role},
    auth::password,
    config::{CorsOrigin, SeedConfig},
    db::handlers::{ApprovedTools, Categories, Repository, Settings, Teams, Users},
    db::models::{
        categories::{CategoryCreateDBRequest, DEFAULT_CATEGORIES},
        settings::BLENDED_HOURLY_RATE_KEY,
        users::UserCreateDBRequest,
    },
    openapi::ApiDoc,
};
use axum::{
    Json, Router, http,
    http::HeaderValue,
    routing::{get, post},
};
use bon::Builder;
pub use config::Config;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::{str::FromStr, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use types::{CategoryId, TeamId, UserId};

/// Application state shared across all request handlers.
///
/// ```ignore
/// let state = AppState::builder().db(pool).config(config).build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Config,
}

/// Get the sairoi database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Create the initial admin user if no account with its email exists yet.
///
/// An existing account is left untouched, including its password. Without a configured password
/// nothing is created: an account nobody can sign in to is of no use.
#[instrument(skip_all, fields(email = %email))]
pub async fn create_initial_admin_user(
    email: &str,
    password: Option<&str>,
    team_id: TeamId,
    argon2_params: password::Argon2Params,
    db: &SqlitePool,
) -> anyhow::Result<Option<UserId>> {
    let email = api::models::users::normalize_email(email);

    let mut tx = db.begin().await?;
    let mut users = Users::new(&mut tx);

    if let Some(existing) = users.get_user_by_email(&email).await? {
        debug!("Initial admin already exists");
        return Ok(Some(existing.id));
    }

    let Some(password) = password else {
        info!("No admin password configured; initial admin not created");
        return Ok(None);
    };
    let password_hash = password::hash_string_with_params(password, argon2_params)
        .map_err(|e| anyhow::anyhow!("Failed to hash admin password: {e}"))?;

    let admin = users
        .create(&UserCreateDBRequest {
            email,
            password_hash,
            role: Role::Admin,
            team_id: Some(team_id),
        })
        .await?;

    tx.commit().await?;
    info!("Initial admin user created");
    Ok(Some(admin.id))
}

/// Write the default team, categories, tool approvals and hourly rate.
///
/// Only missing rows are inserted, so admin edits survive restarts. Returns the default team's id.
#[instrument(skip_all)]
pub async fn seed_database(seed: &SeedConfig, db: &SqlitePool) -> anyhow::Result<TeamId> {
    let mut tx = db.begin().await?;

    let team = Teams::new(&mut tx).get_or_create(&seed.team_name).await?;

    if seed.default_categories {
        let mut categories = Categories::new(&mut tx);
        let mut inserted = 0;
        for default in DEFAULT_CATEGORIES {
            if categories.insert_if_absent(&CategoryCreateDBRequest::from_default(default)).await? {
                inserted += 1;
            }
        }
        debug!(inserted, "Default categories seeded");
    }

    if seed.approve_all_tools {
        let mut tools = ApprovedTools::new(&mut tx);
        for tool in Tool::ALL {
            tools.insert_if_absent(*tool, true).await?;
        }
    }

    Settings::new(&mut tx)
        .insert_if_absent(BLENDED_HOURLY_RATE_KEY, &seed.blended_hourly_rate.to_string())
        .await?;

    tx.commit().await?;
    debug!("Database seeded successfully");

    Ok(team.id)
}

/// Open the database (creating the file if needed) and run migrations.
async fn setup_database(config: &Config) -> anyhow::Result<SqlitePool> {
    let pool_settings = &config.database.pool;
    let options = SqliteConnectOptions::from_str(&config.database.url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(pool_settings.max_connections)
        .min_connections(pool_settings.min_connections)
        .acquire_timeout(Duration::from_secs(pool_settings.acquire_timeout_secs))
        .idle_timeout(pool_settings.idle_timeout())
        .connect_with(options)
        .await?;

    info!(url = %config.database.url, "Database connected");
    Ok(pool)
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors_config = &config.auth.security.cors;

    // Browsers refuse credentialed responses with `*`, so a wildcard drops credentials
    let wildcard = cors_config.allowed_origins.iter().any(|o| matches!(o, CorsOrigin::Wildcard));
    let mut cors = if wildcard {
        CorsLayer::new().allow_origin(AllowOrigin::any())
    } else {
        let mut origins = Vec::new();
        for origin in &cors_config.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                origins.push(url.origin().ascii_serialization().parse::<HeaderValue>()?);
            }
        }
        CorsLayer::new()
            .allow_origin(origins)
            .allow_credentials(cors_config.allow_credentials)
    };

    cors = cors.expose_headers(vec![http::header::LOCATION, http::header::CONTENT_DISPOSITION]);

    if let Some(max_age) = cors_config.max_age {
        cors = cors.max_age(Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the application router with all endpoints and middleware.
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    use api::handlers::{admin, auth, dashboard, events, reports};

    let auth_routes = Router::new()
        .route("/", get(auth::root))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout).post(auth::logout));

    let app_routes = Router::new()
        .route("/dashboard", get(dashboard::get_dashboard))
        .route("/log", get(events::get_log_form).post(events::create_event))
        .route("/api/report", get(reports::export_report));

    let admin_routes = Router::new()
        .route("/admin", get(admin::get_admin_overview))
        .route("/admin/teams", post(admin::create_team))
        .route("/admin/users", post(admin::create_user))
        .route("/admin/tools", post(admin::set_tool_approval))
        .route("/admin/rate", post(admin::set_rate))
        .route("/admin/categories", post(admin::update_category));

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .merge(auth_routes)
        .merge(app_routes)
        .merge(admin_routes)
        .with_state(state.clone())
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    let cors_layer = create_cors_layer(&state.config)?;

    // Tracing wraps CORS so rejected preflights are still traced
    let router = router.layer(
        ServiceBuilder::new()
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                    .on_request(DefaultOnRequest::new().level(Level::INFO))
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            )
            .layer(cors_layer),
    );

    Ok(router)
}

/// Main application struct that owns the router, state and database pool.
///
/// 1. **Create**: [`Application::new`] opens the database, runs migrations and seeds defaults
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and starts handling requests
/// 3. **Shutdown**: When the shutdown future resolves, in-flight requests finish, the pool is
///    closed and pending spans are flushed
pub struct Application {
    router: Router,
    app_state: AppState,
    config: Config,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        Self::new_with_pool(config, None).await
    }

    /// Like [`Application::new`], but over an existing pool when one is given.
    pub async fn new_with_pool(config: Config, pool: Option<SqlitePool>) -> anyhow::Result<Self> {
        debug!("Starting sairoi with configuration: {:#?}", config);

        let pool = match pool {
            Some(pool) => pool,
            None => setup_database(&config).await?,
        };
        migrator().run(&pool).await?;

        let team_id = seed_database(&config.seed, &pool).await?;
        create_initial_admin_user(
            &config.admin_email,
            config.admin_password.as_deref(),
            team_id,
            config.auth.password.argon2_params(),
            &pool,
        )
        .await?;

        let app_state = AppState::builder().db(pool).config(config.clone()).build();
        let router = build_router(&app_state)?;

        Ok(Self {
            router,
            app_state,
            config,
        })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> (axum_test::TestServer, AppState) {
        let server = axum_test::TestServer::new(self.router.into_make_service()).expect("Failed to create test server");
        (server, self.app_state)
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "sairoi listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing database connections...");
        self.app_state.db.close().await;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_app, create_test_config};
    use axum::http::StatusCode;

    #[sqlx::test]
    #[test_log::test]
    async fn test_seeding_is_idempotent_and_preserves_edits(pool: SqlitePool) {
        let seed = SeedConfig::default();
        let team_id = seed_database(&seed, &pool).await.unwrap();

        {
            let mut conn = pool.acquire().await.unwrap();
            Settings::new(&mut conn).set(BLENDED_HOURLY_RATE_KEY, "31").await.unwrap();
            ApprovedTools::new(&mut conn).set_approved(Tool::Gemini, false).await.unwrap();
        }

        let again = seed_database(&seed, &pool).await.unwrap();
        assert_eq!(team_id, again);

        let mut conn = pool.acquire().await.unwrap();
        let categories = Categories::new(&mut conn).list(&Default::default()).await.unwrap();
        assert_eq!(categories.len(), DEFAULT_CATEGORIES.len());
        let kb = categories.iter().find(|c| c.name == "Knowledge base article draft").unwrap();
        assert_eq!((kb.default_minutes_low, kb.default_minutes_high), (15, 40));

        assert_eq!(Settings::new(&mut conn).blended_hourly_rate().await.unwrap(), 31.0);
        let mut tools = ApprovedTools::new(&mut conn);
        assert!(!tools.is_approved(Tool::Gemini).await.unwrap());
        assert!(tools.is_approved(Tool::Claude).await.unwrap());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_initial_admin_created_once(pool: SqlitePool) {
        let config = create_test_config();
        let params = config.auth.password.argon2_params();
        let team_id = seed_database(&config.seed, &pool).await.unwrap();

        let none = create_initial_admin_user("Admin@Example.com", None, team_id, params, &pool).await.unwrap();
        assert!(none.is_none());

        let id = create_initial_admin_user("Admin@Example.com", Some("first-password"), team_id, params, &pool)
            .await
            .unwrap()
            .unwrap();
        let again = create_initial_admin_user("admin@example.com", Some("second-password"), team_id, params, &pool)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(id, again);

        let mut conn = pool.acquire().await.unwrap();
        let admin = Users::new(&mut conn).get_user_by_email("admin@example.com").await.unwrap().unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert_eq!(admin.team_name.as_deref(), Some("Support"));
        // A restart with a different configured password keeps the stored one
        assert!(password::verify_string("first-password", &admin.password_hash).unwrap());
        assert!(!password::verify_string("second-password", &admin.password_hash).unwrap());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_health_docs_and_root(pool: SqlitePool) {
        let (server, _state) = create_test_app(pool).await;

        server.get("/healthz").await.assert_text("OK");

        let doc = server.get("/openapi.json").await;
        doc.assert_status_ok();
        assert!(doc.json::<serde_json::Value>()["paths"]["/api/report"].is_object());

        let root = server.get("/").await;
        root.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(root.header("location"), "/dashboard");
    }

    #[test]
    fn test_cors_wildcard_drops_credentials() {
        let mut config = create_test_config();
        config.auth.security.cors.allowed_origins = vec![CorsOrigin::Wildcard];
        config.auth.security.cors.allow_credentials = true;
        assert!(create_cors_layer(&config).is_ok());
    }
}

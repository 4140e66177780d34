//! Test utilities shared by the unit and HTTP tests.

use crate::api::models::events::{Outcome, ReworkLevel, TimeSavedBucket, Tool};
use crate::api::models::users::Role;
use crate::auth::password::{self, Argon2Params};
use crate::auth::session::start_session;
use crate::config::{Config, PasswordConfig, PoolSettings};
use crate::db::handlers::{AiEvents, Categories, Repository, Teams, Users};
use crate::db::models::{
    categories::{CategoryCreateDBRequest, CategoryDBResponse},
    events::{AiEventCreateDBRequest, AiEventDBResponse},
    teams::{TeamCreateDBRequest, TeamDBResponse},
    users::{UserCreateDBRequest, UserDBResponse},
};
use crate::types::{CategoryId, TeamId, UserId};
use crate::{AppState, Application};
use axum_test::TestServer;
use sqlx::SqlitePool;

/// Password given to every user made by [`create_test_user`].
pub const TEST_PASSWORD: &str = "correct-horse-battery";

fn fast_argon2() -> Argon2Params {
    Argon2Params {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    }
}

pub fn create_test_config() -> Config {
    let mut config = Config::default();
    config.database.pool = PoolSettings {
        max_connections: 4,
        min_connections: 0,
        ..Default::default()
    };
    config.admin_password = None;
    config.auth.session.cookie_secure = false;
    config.auth.password = PasswordConfig {
        argon2_memory_kib: 1024,
        argon2_iterations: 1,
        argon2_parallelism: 1,
        ..Default::default()
    };
    config
}

/// Full application over `pool`, migrated and seeded, behind an in-process test server.
pub async fn create_test_app(pool: SqlitePool) -> (TestServer, AppState) {
    let app = Application::new_with_pool(create_test_config(), Some(pool))
        .await
        .expect("Failed to create application");

    app.into_test_server()
}

pub async fn create_test_team(pool: &SqlitePool, name: &str) -> TeamDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    Teams::new(&mut conn)
        .create(&TeamCreateDBRequest { name: name.to_string() })
        .await
        .expect("Failed to create test team")
}

pub async fn create_test_user(pool: &SqlitePool, email: &str, role: Role, team_id: Option<TeamId>) -> UserDBResponse {
    let password_hash = password::hash_string_with_params(TEST_PASSWORD, fast_argon2()).expect("Failed to hash test password");

    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    Users::new(&mut conn)
        .create(&UserCreateDBRequest {
            email: email.to_string(),
            password_hash,
            role,
            team_id,
        })
        .await
        .expect("Failed to create test user")
}

/// `Cookie` header value for a fresh session belonging to `user_id`.
pub async fn login_cookie(state: &AppState, user_id: UserId) -> String {
    let session = &state.config.auth.session;
    let mut conn = state.db.acquire().await.expect("Failed to acquire connection");
    let token = start_session(&mut conn, user_id, session).await.expect("Failed to start session");

    format!("{}={}", session.cookie_name, token)
}

pub async fn create_test_category(pool: &SqlitePool, name: &str) -> CategoryDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    Categories::new(&mut conn)
        .create(&CategoryCreateDBRequest {
            name: name.to_string(),
            default_minutes_low: 3,
            default_minutes_high: 9,
        })
        .await
        .expect("Failed to create test category")
}

/// An event with no risk flags, an approved tool and no note.
pub async fn create_test_event(
    pool: &SqlitePool,
    user_id: UserId,
    category_id: CategoryId,
    time_saved: TimeSavedBucket,
) -> AiEventDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    AiEvents::new(&mut conn)
        .create(&AiEventCreateDBRequest {
            user_id,
            tool: Tool::Claude,
            category_id,
            time_saved,
            rework: ReworkLevel::None,
            outcome: Outcome::SentToCustomer,
            risk_personal_data: false,
            risk_payment_data: false,
            risk_internal_info: false,
            tool_approved: true,
            note: None,
        })
        .await
        .expect("Failed to create test event")
}

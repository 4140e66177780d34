//! Database repository for users.

use crate::auth::scope::Scope;
use crate::db::{
    errors::Result,
    handlers::repository::Repository,
    models::users::{UserCreateDBRequest, UserDBResponse},
};
use crate::types::{UserId, abbrev_uuid};
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};
use tracing::instrument;
use uuid::Uuid;

const SELECT_USERS: &str = "SELECT u.id, u.email, u.password_hash, u.role, u.team_id, t.name AS team_name, \
     u.created_at, u.updated_at FROM users u LEFT JOIN teams t ON t.id = u.team_id";

/// Filter for listing users
#[derive(Debug, Clone)]
pub struct UserFilter {
    pub limit: i64,
}

impl UserFilter {
    pub fn new(limit: i64) -> Self {
        Self { limit }
    }
}

pub struct Users<'c> {
    db: &'c mut SqliteConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Users<'c> {
    type CreateRequest = UserCreateDBRequest;
    type Response = UserDBResponse;
    type Id = UserId;
    type Filter = UserFilter;

    #[instrument(skip(self, request), fields(email = %request.email, role = ?request.role), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, role, team_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(&request.email)
        .bind(&request.password_hash)
        .bind(request.role)
        .bind(request.team_id)
        .bind(now)
        .bind(now)
        .execute(&mut *self.db)
        .await?;

        let user = sqlx::query_as::<_, UserDBResponse>(&format!("{SELECT_USERS} WHERE u.id = ?"))
            .bind(id)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(user)
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let user = sqlx::query_as::<_, UserDBResponse>(&format!("{SELECT_USERS} WHERE u.id = ?"))
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user)
    }

    /// Newest users first
    #[instrument(skip(self, filter), fields(limit = filter.limit), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let users = sqlx::query_as::<_, UserDBResponse>(&format!(
            "{SELECT_USERS} ORDER BY u.created_at DESC, u.rowid DESC LIMIT ?"
        ))
        .bind(filter.limit)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(users)
    }
}

impl<'c> Users<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    /// Case-insensitive lookup; the column is `COLLATE NOCASE`.
    #[instrument(skip(self), err)]
    pub async fn get_user_by_email(&mut self, email: &str) -> Result<Option<UserDBResponse>> {
        let user = sqlx::query_as::<_, UserDBResponse>(&format!("{SELECT_USERS} WHERE u.email = ?"))
            .bind(email)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user)
    }

    /// Number of users visible under `scope`.
    #[instrument(skip(self), err)]
    pub async fn count_in_scope(&mut self, scope: &Scope) -> Result<i64> {
        let mut query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM users u WHERE ");
        scope.push_predicate(&mut query);

        let count = query.build_query_scalar::<i64>().fetch_one(&mut *self.db).await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::users::Role;
    use crate::db::errors::DbError;
    use crate::db::handlers::Teams;
    use crate::db::models::teams::TeamCreateDBRequest;
    use sqlx::SqlitePool;

    fn request(email: &str, role: Role, team_id: Option<Uuid>) -> UserCreateDBRequest {
        UserCreateDBRequest {
            email: email.to_string(),
            password_hash: "not-a-real-hash".to_string(),
            role,
            team_id,
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_user_joins_team_name(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let team = Teams::new(&mut conn)
            .create(&TeamCreateDBRequest {
                name: "Billing".to_string(),
            })
            .await
            .unwrap();

        let mut repo = Users::new(&mut conn);
        let user = repo
            .create(&request("manager@example.com", Role::Manager, Some(team.id)))
            .await
            .unwrap();

        assert_eq!(user.email, "manager@example.com");
        assert_eq!(user.role, Role::Manager);
        assert_eq!(user.team_id, Some(team.id));
        assert_eq!(user.team_name.as_deref(), Some("Billing"));

        let fetched = repo.get_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(fetched.email, user.email);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_email_lookup_and_uniqueness_ignore_case(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        repo.create(&request("agent@example.com", Role::User, None)).await.unwrap();

        let found = repo.get_user_by_email("AGENT@example.com").await.unwrap();
        assert!(found.is_some());

        let err = repo
            .create(&request("Agent@Example.com", Role::User, None))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_count_in_scope(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut teams = Teams::new(&mut conn);
        let billing = teams
            .create(&TeamCreateDBRequest {
                name: "Billing".to_string(),
            })
            .await
            .unwrap();
        let returns = teams
            .create(&TeamCreateDBRequest {
                name: "Returns".to_string(),
            })
            .await
            .unwrap();

        let mut repo = Users::new(&mut conn);
        repo.create(&request("a@example.com", Role::User, Some(billing.id))).await.unwrap();
        repo.create(&request("b@example.com", Role::Manager, Some(billing.id))).await.unwrap();
        repo.create(&request("c@example.com", Role::User, Some(returns.id))).await.unwrap();
        let loner = repo.create(&request("d@example.com", Role::User, None)).await.unwrap();

        assert_eq!(repo.count_in_scope(&Scope::All).await.unwrap(), 4);
        assert_eq!(repo.count_in_scope(&Scope::Team(billing.id)).await.unwrap(), 2);
        assert_eq!(repo.count_in_scope(&Scope::Team(returns.id)).await.unwrap(), 1);
        assert_eq!(repo.count_in_scope(&Scope::User(loner.id)).await.unwrap(), 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_newest_first_with_limit(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        for i in 0..3 {
            repo.create(&request(&format!("user{i}@example.com"), Role::User, None))
                .await
                .unwrap();
        }

        let users = repo.list(&UserFilter::new(2)).await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].email, "user2@example.com");
        assert_eq!(users[1].email, "user1@example.com");
    }
}

//! Database repository for login sessions.

use crate::db::{
    errors::Result,
    models::sessions::{SessionCreateDBRequest, SessionDBResponse},
};
use crate::types::abbrev_uuid;
use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::instrument;
use uuid::Uuid;

const SESSION_COLUMNS: &str = "id, token_hash, user_id, expires_at, created_at";

/// Login sessions. There is no generic list or id lookup: a session is only ever reached through
/// its token digest.
pub struct Sessions<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Sessions<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&request.user_id)), err)]
    pub async fn create(&mut self, request: &SessionCreateDBRequest) -> Result<SessionDBResponse> {
        let session = sqlx::query_as::<_, SessionDBResponse>(&format!(
            "INSERT INTO sessions (id, token_hash, user_id, expires_at, created_at) VALUES (?, ?, ?, ?, ?) \
             RETURNING {SESSION_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&request.token_hash)
        .bind(request.user_id)
        .bind(request.expires_at)
        .bind(Utc::now())
        .fetch_one(&mut *self.db)
        .await?;

        Ok(session)
    }

    #[instrument(skip_all, err)]
    pub async fn get_by_token_hash(&mut self, token_hash: &str) -> Result<Option<SessionDBResponse>> {
        let session = sqlx::query_as::<_, SessionDBResponse>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE token_hash = ?"
        ))
        .bind(token_hash)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(session)
    }

    /// Delete by token digest. Deleting a session that is already gone is not an error; the
    /// return value says whether this call removed it.
    #[instrument(skip_all, err)]
    pub async fn delete_by_token_hash(&mut self, token_hash: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
            .bind(token_hash)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_user;
    use crate::api::models::users::Role;
    use chrono::Duration;
    use sqlx::SqlitePool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_and_lookup_by_digest(pool: SqlitePool) {
        let user = create_test_user(&pool, "agent@example.com", Role::User, None).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Sessions::new(&mut conn);

        let created = repo
            .create(&SessionCreateDBRequest {
                user_id: user.id,
                token_hash: "digest-1".to_string(),
                expires_at: Utc::now() + Duration::days(1),
            })
            .await
            .unwrap();

        let found = repo.get_by_token_hash("digest-1").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.user_id, user.id);
        assert!(!found.is_expired(Utc::now()));
        assert!(repo.get_by_token_hash("digest-2").await.unwrap().is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete_is_idempotent(pool: SqlitePool) {
        let user = create_test_user(&pool, "agent@example.com", Role::User, None).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Sessions::new(&mut conn);

        repo.create(&SessionCreateDBRequest {
            user_id: user.id,
            token_hash: "digest".to_string(),
            expires_at: Utc::now() - Duration::minutes(1),
        })
        .await
        .unwrap();

        assert!(repo.delete_by_token_hash("digest").await.unwrap());
        assert!(!repo.delete_by_token_hash("digest").await.unwrap());
        assert!(repo.get_by_token_hash("digest").await.unwrap().is_none());
    }
}

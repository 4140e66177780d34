//! Database models for login sessions.

use crate::types::{SessionId, UserId};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Request for creating a session. Only the digest of the raw token is persisted.
#[derive(Debug, Clone)]
pub struct SessionCreateDBRequest {
    pub user_id: UserId,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct SessionDBResponse {
    pub id: SessionId,
    pub token_hash: String,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl SessionDBResponse {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

//! Database models for users.

use crate::api::models::users::Role;
use crate::types::{TeamId, UserId};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database request for creating a new user
#[derive(Debug, Clone)]
pub struct UserCreateDBRequest {
    /// Already normalized
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub team_id: Option<TeamId>,
}

/// Database response for a user, with the team name joined in
#[derive(Debug, Clone, FromRow)]
pub struct UserDBResponse {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub team_id: Option<TeamId>,
    pub team_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

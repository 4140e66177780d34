//! API request/response models for users.

use super::WireCode;
use crate::db::models::users::UserDBResponse;
use crate::types::{TeamId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Role enum for access levels
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash, ToSchema)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Manager,
    Admin,
}

impl WireCode for Role {
    const ALL: &'static [Self] = &[Role::User, Role::Manager, Role::Admin];

    fn code(self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Manager => "MANAGER",
            Role::Admin => "ADMIN",
        }
    }
}

/// The identity resolved from a session cookie.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CurrentUser {
    #[schema(value_type = String, format = "uuid")]
    pub id: UserId,
    pub email: String,
    pub role: Role,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub team_id: Option<TeamId>,
    pub team_name: Option<String>,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<UserDBResponse> for CurrentUser {
    fn from(db: UserDBResponse) -> Self {
        Self {
            id: db.id,
            email: db.email,
            role: db.role,
            team_id: db.team_id,
            team_name: db.team_name,
        }
    }
}

// User response models
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: UserId,
    pub email: String,
    pub role: Role,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub team_id: Option<TeamId>,
    pub team_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<UserDBResponse> for UserResponse {
    fn from(db: UserDBResponse) -> Self {
        Self {
            id: db.id,
            email: db.email,
            role: db.role,
            team_id: db.team_id,
            team_name: db.team_name,
            created_at: db.created_at,
        }
    }
}

/// Canonical form of a login or account email: trimmed and lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

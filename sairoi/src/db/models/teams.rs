//! Database models for teams.

use crate::types::TeamId;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone)]
pub struct TeamCreateDBRequest {
    pub name: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct TeamDBResponse {
    pub id: TeamId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

//! API response models for teams.

use crate::db::models::teams::TeamDBResponse;
use crate::types::TeamId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TeamResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: TeamId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<TeamDBResponse> for TeamResponse {
    fn from(db: TeamDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            created_at: db.created_at,
        }
    }
}

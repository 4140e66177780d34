//! Database models for the approved-tool allow-list.

use crate::api::models::events::Tool;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct ApprovedToolDBResponse {
    pub tool: Tool,
    pub approved: bool,
    pub updated_at: DateTime<Utc>,
}

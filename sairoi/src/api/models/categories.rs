//! API response models for assist categories.

use crate::db::models::categories::CategoryDBResponse;
use crate::types::CategoryId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: CategoryId,
    pub name: String,
    /// Typical minutes saved, low end. Informational only.
    pub default_minutes_low: i64,
    /// Typical minutes saved, high end. Informational only.
    pub default_minutes_high: i64,
    pub active: bool,
}

impl From<CategoryDBResponse> for CategoryResponse {
    fn from(db: CategoryDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            default_minutes_low: db.default_minutes_low,
            default_minutes_high: db.default_minutes_high,
            active: db.active,
        }
    }
}

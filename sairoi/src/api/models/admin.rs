//! Admin console view model and mutation forms.
//!
//! Form fields arrive as optional text. Each form knows how to turn itself into a validated
//! change, returning `None` (or keeping the stored value) when the input cannot be used.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::non_blank;
use crate::api::models::categories::CategoryResponse;
use crate::api::models::events::ToolOption;
use crate::api::models::teams::TeamResponse;
use crate::api::models::users::UserResponse;
use crate::db::models::categories::CategoryUpdateDBRequest;
use crate::types::CategoryId;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminOverview {
    /// By name
    pub teams: Vec<TeamResponse>,
    /// Newest first, at most 50
    pub users: Vec<UserResponse>,
    /// By name, including inactive ones
    pub categories: Vec<CategoryResponse>,
    /// Every tool, approved or not
    pub tools: Vec<ToolOption>,
    pub blended_hourly_rate: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct TeamCreateForm {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserCreateForm {
    pub email: Option<String>,
    pub password: Option<String>,
    /// USER, MANAGER or ADMIN; USER when absent
    pub role: Option<String>,
    /// Empty for no team
    pub team_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ToolApprovalForm {
    pub tool: Option<String>,
    /// "1" approves and any other value revokes. Approves when absent.
    pub approved: Option<String>,
}

impl ToolApprovalForm {
    pub fn is_approved(&self) -> bool {
        self.approved.as_deref().is_none_or(|v| v.trim() == "1")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RateForm {
    pub rate: Option<String>,
}

impl RateForm {
    /// The submitted rate, if it is a finite, non-negative number.
    pub fn parsed_rate(&self) -> Option<f64> {
        non_blank(self.rate.as_deref())
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|rate| rate.is_finite() && *rate >= 0.0)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUpdateForm {
    pub id: Option<String>,
    pub low: Option<String>,
    pub high: Option<String>,
    /// "1" flips the active flag
    pub toggle_active: Option<String>,
}

fn parse_minutes(value: Option<&str>) -> Option<i64> {
    non_blank(value).and_then(|v| v.parse::<i64>().ok()).filter(|m| *m >= 0)
}

impl CategoryUpdateForm {
    pub fn category_id(&self) -> Option<CategoryId> {
        non_blank(self.id.as_deref()).and_then(|id| Uuid::parse_str(id).ok())
    }

    /// Unusable `low`/`high` values become `None`, which keeps the stored value.
    pub fn to_update(&self) -> CategoryUpdateDBRequest {
        CategoryUpdateDBRequest {
            default_minutes_low: parse_minutes(self.low.as_deref()),
            default_minutes_high: parse_minutes(self.high.as_deref()),
            toggle_active: self.toggle_active.as_deref().map(str::trim) == Some("1"),
        }
    }
}

//! Dashboard view model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::api::models::events::EventResponse;
use crate::api::models::users::CurrentUser;
use crate::metrics::format_hours;
use crate::metrics::roi::{CategoryRollup, RoiSummary};
use crate::types::CategoryId;

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct DashboardQuery {
    /// Days to cover, clamped to the configured dashboard maximum. Non-numeric values use the
    /// default.
    pub days: Option<String>,
}

/// Headline ROI figures for the window.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardMetrics {
    pub total_sessions: u64,
    pub wau: u64,
    pub users_in_scope: u64,
    pub adoption_pct: f64,
    pub total_minutes: u64,
    pub hours_saved: f64,
    /// `hours_saved` formatted for display
    pub hours_saved_display: String,
    pub value_estimate: f64,
    pub rework_rate: f64,
    pub risk_flag_count: u64,
}

impl From<&RoiSummary> for DashboardMetrics {
    fn from(summary: &RoiSummary) -> Self {
        Self {
            total_sessions: summary.total_sessions,
            wau: summary.wau,
            users_in_scope: summary.users_in_scope,
            adoption_pct: summary.adoption_pct,
            total_minutes: summary.total_minutes,
            hours_saved: summary.hours_saved,
            hours_saved_display: format_hours(summary.total_minutes),
            value_estimate: summary.value_estimate,
            rework_rate: summary.rework_rate,
            risk_flag_count: summary.risk_flag_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryRollupResponse {
    #[schema(value_type = String, format = "uuid")]
    pub category_id: CategoryId,
    pub name: String,
    pub sessions: u64,
    pub minutes: u64,
    pub hours_display: String,
    pub heavy_rework: u64,
}

impl From<&CategoryRollup> for CategoryRollupResponse {
    fn from(rollup: &CategoryRollup) -> Self {
        Self {
            category_id: rollup.category_id,
            name: rollup.name.clone(),
            sessions: rollup.sessions,
            minutes: rollup.minutes,
            hours_display: format_hours(rollup.minutes),
            heavy_rework: rollup.heavy_rework,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardResponse {
    pub days: i64,
    /// Inclusive start of the window, 00:00 UTC
    pub from: DateTime<Utc>,
    /// "All teams", "Your team" or "Your account"
    pub scope: String,
    pub viewer: CurrentUser,
    /// Blended hourly rate used for `value_estimate`, GBP
    pub hourly_rate: f64,
    pub metrics: DashboardMetrics,
    pub top_categories: Vec<CategoryRollupResponse>,
    /// Most recent events first
    pub recent_sessions: Vec<EventResponse>,
}

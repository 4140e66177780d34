//! Database models for AI-assist events.

use crate::api::models::events::{Outcome, ReworkLevel, TimeSavedBucket, Tool};
use crate::auth::scope::Scope;
use crate::types::{CategoryId, EventId, UserId};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database request for appending an event
#[derive(Debug, Clone)]
pub struct AiEventCreateDBRequest {
    pub user_id: UserId,
    pub tool: Tool,
    pub category_id: CategoryId,
    pub time_saved: TimeSavedBucket,
    pub rework: ReworkLevel,
    pub outcome: Outcome,
    pub risk_personal_data: bool,
    pub risk_payment_data: bool,
    pub risk_internal_info: bool,
    pub tool_approved: bool,
    pub note: Option<String>,
}

/// An event joined with its owner's email and team and its category name.
#[derive(Debug, Clone, FromRow)]
pub struct AiEventDBResponse {
    pub id: EventId,
    pub user_id: UserId,
    pub user_email: String,
    pub team_name: Option<String>,
    pub tool: Tool,
    pub category_id: CategoryId,
    pub category_name: String,
    /// Bucket code as stored; may be a code no longer offered
    pub time_saved: String,
    pub rework: ReworkLevel,
    pub outcome: Outcome,
    pub risk_personal_data: bool,
    pub risk_payment_data: bool,
    pub risk_internal_info: bool,
    pub tool_approved: bool,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AiEventDBResponse {
    /// Any content flag raised, or the tool was not approved when the event was logged.
    pub fn has_risk_signal(&self) -> bool {
        self.risk_personal_data || self.risk_payment_data || self.risk_internal_info || !self.tool_approved
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOrder {
    OldestFirst,
    NewestFirst,
}

/// Filter for listing events
#[derive(Debug, Clone)]
pub struct AiEventFilter {
    pub scope: Scope,
    /// Inclusive lower bound on `created_at`
    pub since: DateTime<Utc>,
    pub order: EventOrder,
    pub limit: Option<i64>,
}

impl AiEventFilter {
    pub fn new(scope: Scope, since: DateTime<Utc>, order: EventOrder) -> Self {
        Self {
            scope,
            since,
            order,
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

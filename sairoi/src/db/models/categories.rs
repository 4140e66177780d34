//! Database models for assist categories.

use crate::types::CategoryId;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone)]
pub struct CategoryCreateDBRequest {
    pub name: String,
    pub default_minutes_low: i64,
    pub default_minutes_high: i64,
}

/// Partial update; `None` fields keep their stored value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryUpdateDBRequest {
    pub default_minutes_low: Option<i64>,
    pub default_minutes_high: Option<i64>,
    pub toggle_active: bool,
}

#[derive(Debug, Clone, FromRow)]
pub struct CategoryDBResponse {
    pub id: CategoryId,
    pub name: String,
    pub default_minutes_low: i64,
    pub default_minutes_high: i64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Filter for listing categories
#[derive(Debug, Clone, Default)]
pub struct CategoryFilter {
    pub active_only: bool,
}

impl CategoryFilter {
    pub fn active() -> Self {
        Self { active_only: true }
    }
}

/// Catalog written on first startup: name with its default time-saved range in minutes.
pub const DEFAULT_CATEGORIES: &[(&str, i64, i64)] = &[
    ("Summarise ticket thread", 4, 8),
    ("Draft first reply", 5, 12),
    ("Rewrite tone (friendly/professional)", 2, 5),
    ("Troubleshooting steps", 6, 15),
    ("Explain policy clearly", 4, 10),
    ("Translate customer message", 2, 6),
    ("Simplify technical explanation", 3, 8),
    ("Create internal handoff note", 3, 7),
    ("Escalation summary for Tier 2", 5, 10),
    ("Suggest tags/category", 1, 3),
    ("Extract key details (order/device/version)", 2, 5),
    ("Refund/return wording", 3, 7),
    ("Apology + service recovery", 3, 7),
    ("Follow-up/check-in message", 2, 5),
    ("GDPR/privacy response template", 4, 10),
    ("Troubleshooting checklist", 6, 12),
    ("Macro/canned response improvement", 3, 8),
    ("Knowledge base article draft", 15, 40),
    ("Call/chat recap summary", 4, 9),
    ("Sentiment check (angry/confused)", 1, 3),
];

impl CategoryCreateDBRequest {
    pub fn from_default(&(name, low, high): &(&str, i64, i64)) -> Self {
        Self {
            name: name.to_string(),
            default_minutes_low: low,
            default_minutes_high: high,
        }
    }
}

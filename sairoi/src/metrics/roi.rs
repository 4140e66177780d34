//! Reduction of events into ROI figures.

use std::collections::{HashMap, HashSet};

use super::conservative_minutes;
use crate::api::models::events::ReworkLevel;
use crate::db::models::events::AiEventDBResponse;
use crate::types::CategoryId;

/// Number of categories kept in the rollup.
pub const TOP_CATEGORIES: usize = 8;

/// Per-category totals.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRollup {
    pub category_id: CategoryId,
    pub name: String,
    pub sessions: u64,
    pub minutes: u64,
    pub heavy_rework: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoiSummary {
    pub total_sessions: u64,
    /// Distinct users with at least one event in the window
    pub wau: u64,
    pub users_in_scope: u64,
    pub adoption_pct: f64,
    pub total_minutes: u64,
    pub hours_saved: f64,
    pub value_estimate: f64,
    pub rework_rate: f64,
    pub risk_flag_count: u64,
    /// Top categories by minutes saved, at most [`TOP_CATEGORIES`]
    pub categories: Vec<CategoryRollup>,
}

fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Reduce scoped events into ROI figures.
///
/// `users_in_scope` must be counted under the same scope the events were read with.
pub fn summarize(events: &[AiEventDBResponse], users_in_scope: u64, hourly_rate: f64) -> RoiSummary {
    let total_sessions = events.len() as u64;
    let wau = events.iter().map(|e| e.user_id).collect::<HashSet<_>>().len() as u64;
    let total_minutes: u64 = events.iter().map(|e| conservative_minutes(&e.time_saved)).sum();
    let reworked = events.iter().filter(|e| e.rework != ReworkLevel::None).count() as u64;
    let risk_flag_count = events.iter().filter(|e| e.has_risk_signal()).count() as u64;

    let hours_saved = total_minutes as f64 / 60.0;

    RoiSummary {
        total_sessions,
        wau,
        users_in_scope,
        adoption_pct: percentage(wau, users_in_scope),
        total_minutes,
        hours_saved,
        value_estimate: hours_saved * hourly_rate,
        rework_rate: percentage(reworked, total_sessions),
        risk_flag_count,
        categories: category_rollups(events),
    }
}

/// Group by category in first-seen order, then keep the top entries by minutes. The sort is
/// stable, so ties stay in first-seen order.
pub fn category_rollups(events: &[AiEventDBResponse]) -> Vec<CategoryRollup> {
    let mut rollups: Vec<CategoryRollup> = Vec::new();
    let mut index: HashMap<CategoryId, usize> = HashMap::new();

    for event in events {
        let slot = *index.entry(event.category_id).or_insert_with(|| {
            rollups.push(CategoryRollup {
                category_id: event.category_id,
                name: event.category_name.clone(),
                sessions: 0,
                minutes: 0,
                heavy_rework: 0,
            });
            rollups.len() - 1
        });

        let rollup = &mut rollups[slot];
        rollup.sessions += 1;
        rollup.minutes += conservative_minutes(&event.time_saved);
        if event.rework == ReworkLevel::Heavy {
            rollup.heavy_rework += 1;
        }
    }

    rollups.sort_by(|a, b| b.minutes.cmp(&a.minutes));
    rollups.truncate(TOP_CATEGORIES);
    rollups
}

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::Utc;

use crate::{
    AppState,
    api::{
        handlers::reports::load_scoped_inputs,
        models::{
            dashboard::{CategoryRollupResponse, DashboardMetrics, DashboardQuery, DashboardResponse},
            events::EventResponse,
            users::CurrentUser,
        },
    },
    auth::{
        permissions::{ANY_ROLE, require_role},
        scope::Scope,
    },
    db::models::events::{AiEventFilter, EventOrder},
    errors::Error,
    metrics::{roi::summarize, window},
    types::{Operation, Resource},
};

/// ROI metrics for the caller's scope
#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "dashboard",
    params(DashboardQuery),
    responses(
        (status = 200, description = "Dashboard view model", body = DashboardResponse),
        (status = 401, description = "Not signed in"),
    ),
    security(("session_cookie" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn get_dashboard(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardResponse>, Error> {
    require_role(&current_user, ANY_ROLE, Operation::Read, Resource::Events)?;

    let reporting = &state.config.reporting;
    let days = window::clamp_days(query.days.as_deref(), reporting.default_days, reporting.dashboard_max_days);
    let from = window::window_start(Utc::now(), days);
    let scope = Scope::for_user(&current_user);

    let filter = AiEventFilter::new(scope, from, EventOrder::NewestFirst).with_limit(reporting.dashboard_event_limit);
    let inputs = load_scoped_inputs(&state.db, &filter).await?;
    let summary = summarize(&inputs.events, inputs.users_in_scope, inputs.hourly_rate);

    Ok(Json(DashboardResponse {
        days,
        from,
        scope: scope.label().to_string(),
        viewer: current_user,
        hourly_rate: inputs.hourly_rate,
        metrics: DashboardMetrics::from(&summary),
        top_categories: summary.categories.iter().map(CategoryRollupResponse::from).collect(),
        recent_sessions: inputs
            .events
            .iter()
            .take(reporting.recent_sessions)
            .map(EventResponse::from)
            .collect(),
    }))
}

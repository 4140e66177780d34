use axum::{
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use sqlx::SqlitePool;

use crate::{
    AppState,
    api::models::{reports::ReportQuery, users::CurrentUser},
    auth::{
        permissions::{ANY_ROLE, require_role},
        scope::Scope,
    },
    db::{
        errors::DbError,
        handlers::{AiEvents, Repository, Settings, Users},
        models::events::{AiEventDBResponse, AiEventFilter, EventOrder},
    },
    errors::Error,
    export::csv::{ReportHeader, render_report, report_filename},
    metrics::{roi::summarize, window},
    types::{Operation, Resource},
};

/// Everything a scoped report is computed from.
pub(crate) struct ScopedInputs {
    pub events: Vec<AiEventDBResponse>,
    pub users_in_scope: u64,
    pub hourly_rate: f64,
}

/// Fetch events, the scoped user count and the current hourly rate. The three reads are
/// independent and run concurrently on separate connections.
pub(crate) async fn load_scoped_inputs(db: &SqlitePool, filter: &AiEventFilter) -> Result<ScopedInputs, Error> {
    let events = async {
        let mut conn = db.acquire().await.map_err(DbError::from)?;
        AiEvents::new(&mut conn).list(filter).await
    };
    let users_in_scope = async {
        let mut conn = db.acquire().await.map_err(DbError::from)?;
        Users::new(&mut conn).count_in_scope(&filter.scope).await
    };
    let hourly_rate = async {
        let mut conn = db.acquire().await.map_err(DbError::from)?;
        Settings::new(&mut conn).blended_hourly_rate().await
    };

    let (events, users_in_scope, hourly_rate) = tokio::try_join!(events, users_in_scope, hourly_rate)?;

    Ok(ScopedInputs {
        events,
        users_in_scope: u64::try_from(users_in_scope).unwrap_or(0),
        hourly_rate,
    })
}

/// Export the caller's scoped events as CSV
#[utoipa::path(
    get,
    path = "/api/report",
    tag = "reports",
    params(ReportQuery),
    responses(
        (status = 200, description = "CSV report, oldest event first", body = String, content_type = "text/csv"),
        (status = 401, description = "Not signed in"),
    ),
    security(("session_cookie" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn export_report(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ReportQuery>,
) -> Result<Response, Error> {
    require_role(&current_user, ANY_ROLE, Operation::Read, Resource::Reports)?;

    let reporting = &state.config.reporting;
    let days = window::clamp_days(query.days.as_deref(), reporting.default_days, reporting.export_max_days);
    let from = window::window_start(Utc::now(), days);
    let scope = Scope::for_user(&current_user);

    let filter = AiEventFilter::new(scope, from, EventOrder::OldestFirst);
    let inputs = load_scoped_inputs(&state.db, &filter).await?;
    let summary = summarize(&inputs.events, inputs.users_in_scope, inputs.hourly_rate);

    let header = ReportHeader {
        days,
        from,
        scope,
        hours_saved: summary.hours_saved,
        value_estimate: summary.value_estimate,
    };
    let body = render_report(&header, &inputs.events).map_err(|e| Error::Internal {
        operation: format!("render CSV report: {e}"),
    })?;

    tracing::debug!(days, rows = inputs.events.len(), scope = scope.tag(), "Exported report");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", report_filename(days)),
            ),
        ],
        body,
    )
        .into_response())
}

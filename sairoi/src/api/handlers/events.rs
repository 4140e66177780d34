use std::collections::HashMap;

use axum::{Form, Json, extract::State, response::Redirect};
use tracing::info;

use crate::{
    AppState,
    api::models::{
        WireCode,
        categories::CategoryResponse,
        events::{BucketOption, EventCreateForm, LogFormResponse, Outcome, ReworkLevel, TimeSavedBucket, Tool, ToolOption},
        users::CurrentUser,
    },
    auth::permissions::{ANY_ROLE, require_role},
    db::{
        errors::DbError,
        handlers::{AiEvents, ApprovedTools, Categories, Repository},
        models::{categories::CategoryFilter, events::AiEventCreateDBRequest},
    },
    errors::Error,
    types::{Operation, Resource, abbrev_uuid},
};

/// Every tool with its approval state; tools without a stored row are unapproved.
pub(crate) async fn tool_options(tools: &mut ApprovedTools<'_>) -> Result<Vec<ToolOption>, DbError> {
    let stored: HashMap<Tool, bool> = tools.list().await?.into_iter().map(|row| (row.tool, row.approved)).collect();

    Ok(Tool::ALL
        .iter()
        .map(|tool| ToolOption {
            tool: *tool,
            approved: stored.get(tool).copied().unwrap_or(false),
        })
        .collect())
}

/// Options for the event logging form
#[utoipa::path(
    get,
    path = "/log",
    tag = "events",
    responses(
        (status = 200, description = "Event logging form options", body = LogFormResponse),
        (status = 401, description = "Not signed in"),
    ),
    security(("session_cookie" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn get_log_form(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<LogFormResponse>, Error> {
    require_role(&current_user, ANY_ROLE, Operation::Create, Resource::Events)?;

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let categories = Categories::new(&mut conn).list(&CategoryFilter::active()).await?;
    let tools = tool_options(&mut ApprovedTools::new(&mut conn)).await?;

    Ok(Json(LogFormResponse {
        categories: categories.into_iter().map(CategoryResponse::from).collect(),
        tools,
        time_saved_options: TimeSavedBucket::ALL.iter().copied().map(BucketOption::from).collect(),
        rework_options: ReworkLevel::ALL.to_vec(),
        outcome_options: Outcome::ALL.to_vec(),
    }))
}

/// Log an AI-assist event
#[utoipa::path(
    post,
    path = "/log",
    tag = "events",
    request_body(content = EventCreateForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Event recorded, redirected to /dashboard"),
        (status = 400, description = "Missing or invalid field, or unknown category"),
        (status = 401, description = "Not signed in"),
    ),
    security(("session_cookie" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn create_event(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Form(form): Form<EventCreateForm>,
) -> Result<Redirect, Error> {
    require_role(&current_user, ANY_ROLE, Operation::Create, Resource::Events)?;
    let submission = form.validate()?;

    let mut tx = state.db.begin().await.map_err(DbError::from)?;

    if Categories::new(&mut tx).get_by_id(submission.category_id).await?.is_none() {
        return Err(Error::BadRequest {
            message: format!("Unknown category: {}", submission.category_id),
        });
    }

    // Snapshot of the allow-list at logging time; later approval changes do not touch this row
    let tool_approved = ApprovedTools::new(&mut tx).is_approved(submission.tool).await?;

    let event = AiEvents::new(&mut tx)
        .create(&AiEventCreateDBRequest {
            user_id: current_user.id,
            tool: submission.tool,
            category_id: submission.category_id,
            time_saved: submission.time_saved,
            rework: submission.rework,
            outcome: submission.outcome,
            risk_personal_data: submission.risk_personal_data,
            risk_payment_data: submission.risk_payment_data,
            risk_internal_info: submission.risk_internal_info,
            tool_approved,
            note: submission.note,
        })
        .await?;

    tx.commit().await.map_err(DbError::from)?;
    info!(event_id = %abbrev_uuid(&event.id), tool = submission.tool.code(), tool_approved, "Event logged");

    Ok(Redirect::to("/dashboard"))
}

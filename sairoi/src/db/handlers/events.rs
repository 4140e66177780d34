//! Database repository for the AI-assist event log.
//!
//! Events are append-only: there is no update or delete path.

use crate::api::models::WireCode;
use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::events::{AiEventCreateDBRequest, AiEventDBResponse, AiEventFilter, EventOrder},
};
use crate::types::{EventId, abbrev_uuid};
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};
use tracing::instrument;
use uuid::Uuid;

const SELECT_EVENTS: &str = r#"
    SELECT e.id, e.user_id, u.email AS user_email, t.name AS team_name, e.tool, e.category_id,
           c.name AS category_name, e.time_saved, e.rework, e.outcome, e.risk_personal_data,
           e.risk_payment_data, e.risk_internal_info, e.tool_approved, e.note, e.created_at
    FROM ai_events e
    JOIN users u ON u.id = e.user_id
    LEFT JOIN teams t ON t.id = u.team_id
    JOIN categories c ON c.id = e.category_id
"#;

pub struct AiEvents<'c> {
    db: &'c mut SqliteConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for AiEvents<'c> {
    type CreateRequest = AiEventCreateDBRequest;
    type Response = AiEventDBResponse;
    type Id = EventId;
    type Filter = AiEventFilter;

    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&request.user_id), tool = ?request.tool), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO ai_events (
                id, user_id, tool, category_id, time_saved, rework, outcome,
                risk_personal_data, risk_payment_data, risk_internal_info, tool_approved, note, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(request.user_id)
        .bind(request.tool)
        .bind(request.category_id)
        .bind(request.time_saved.code())
        .bind(request.rework)
        .bind(request.outcome)
        .bind(request.risk_personal_data)
        .bind(request.risk_payment_data)
        .bind(request.risk_internal_info)
        .bind(request.tool_approved)
        .bind(&request.note)
        .bind(Utc::now())
        .execute(&mut *self.db)
        .await?;

        self.get_by_id(id).await?.ok_or(DbError::NotFound)
    }

    #[instrument(skip(self), fields(event_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let event = sqlx::query_as::<_, AiEventDBResponse>(&format!("{SELECT_EVENTS} WHERE e.id = ?"))
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(event)
    }

    /// Events in scope created at or after `since`. Insertion order breaks timestamp ties.
    #[instrument(skip(self, filter), fields(scope = filter.scope.tag(), since = %filter.since, limit = ?filter.limit), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::<Sqlite>::new(SELECT_EVENTS);
        query.push(" WHERE e.created_at >= ").push_bind(filter.since).push(" AND ");
        filter.scope.push_predicate(&mut query);

        query.push(match filter.order {
            EventOrder::OldestFirst => " ORDER BY e.created_at ASC, e.rowid ASC",
            EventOrder::NewestFirst => " ORDER BY e.created_at DESC, e.rowid DESC",
        });

        if let Some(limit) = filter.limit {
            query.push(" LIMIT ").push_bind(limit);
        }

        let events = query.build_query_as::<AiEventDBResponse>().fetch_all(&mut *self.db).await?;
        Ok(events)
    }
}

impl<'c> AiEvents<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }
}

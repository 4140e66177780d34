//! Database repository for the approved-tool allow-list.

use crate::api::models::events::Tool;
use crate::db::{errors::Result, models::tools::ApprovedToolDBResponse};
use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::instrument;

pub struct ApprovedTools<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> ApprovedTools<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    /// Stored rows only; tools without a row are unapproved.
    #[instrument(skip(self), err)]
    pub async fn list(&mut self) -> Result<Vec<ApprovedToolDBResponse>> {
        let tools = sqlx::query_as::<_, ApprovedToolDBResponse>(
            "SELECT tool, approved, updated_at FROM approved_tools ORDER BY tool ASC",
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(tools)
    }

    #[instrument(skip(self), err)]
    pub async fn is_approved(&mut self, tool: Tool) -> Result<bool> {
        let approved = sqlx::query_scalar::<_, bool>("SELECT approved FROM approved_tools WHERE tool = ?")
            .bind(tool)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(approved.unwrap_or(false))
    }

    #[instrument(skip(self), err)]
    pub async fn set_approved(&mut self, tool: Tool, approved: bool) -> Result<()> {
        sqlx::query(
            "INSERT INTO approved_tools (tool, approved, updated_at) VALUES (?, ?, ?) \
             ON CONFLICT (tool) DO UPDATE SET approved = excluded.approved, updated_at = excluded.updated_at",
        )
        .bind(tool)
        .bind(approved)
        .bind(Utc::now())
        .execute(&mut *self.db)
        .await?;

        Ok(())
    }

    /// Returns whether a row was written.
    #[instrument(skip(self), err)]
    pub async fn insert_if_absent(&mut self, tool: Tool, approved: bool) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO approved_tools (tool, approved, updated_at) VALUES (?, ?, ?) ON CONFLICT (tool) DO NOTHING",
        )
        .bind(tool)
        .bind(approved)
        .bind(Utc::now())
        .execute(&mut *self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

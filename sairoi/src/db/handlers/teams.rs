//! Database repository for teams.

use crate::db::{
    errors::Result,
    handlers::repository::Repository,
    models::teams::{TeamCreateDBRequest, TeamDBResponse},
};
use crate::types::{TeamId, abbrev_uuid};
use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::instrument;
use uuid::Uuid;

pub struct Teams<'c> {
    db: &'c mut SqliteConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Teams<'c> {
    type CreateRequest = TeamCreateDBRequest;
    type Response = TeamDBResponse;
    type Id = TeamId;
    type Filter = ();

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let team = sqlx::query_as::<_, TeamDBResponse>(
            "INSERT INTO teams (id, name, created_at) VALUES (?, ?, ?) RETURNING id, name, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(&request.name)
        .bind(Utc::now())
        .fetch_one(&mut *self.db)
        .await?;

        Ok(team)
    }

    #[instrument(skip(self), fields(team_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let team = sqlx::query_as::<_, TeamDBResponse>("SELECT id, name, created_at FROM teams WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(team)
    }

    /// All teams, by name
    #[instrument(skip(self, _filter), err)]
    async fn list(&mut self, _filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let teams = sqlx::query_as::<_, TeamDBResponse>("SELECT id, name, created_at FROM teams ORDER BY name ASC")
            .fetch_all(&mut *self.db)
            .await?;

        Ok(teams)
    }
}

impl<'c> Teams<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self), err)]
    pub async fn get_by_name(&mut self, name: &str) -> Result<Option<TeamDBResponse>> {
        let team = sqlx::query_as::<_, TeamDBResponse>("SELECT id, name, created_at FROM teams WHERE name = ?")
            .bind(name)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(team)
    }

    /// Return the team with this name, creating it first if needed.
    #[instrument(skip(self), err)]
    pub async fn get_or_create(&mut self, name: &str) -> Result<TeamDBResponse> {
        sqlx::query("INSERT INTO teams (id, name, created_at) VALUES (?, ?, ?) ON CONFLICT (name) DO NOTHING")
            .bind(Uuid::new_v4())
            .bind(name)
            .bind(Utc::now())
            .execute(&mut *self.db)
            .await?;

        let team = sqlx::query_as::<_, TeamDBResponse>("SELECT id, name, created_at FROM teams WHERE name = ?")
            .bind(name)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(team)
    }
}

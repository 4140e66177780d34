//! Database repository for assist categories.

use crate::db::{
    errors::Result,
    handlers::repository::Repository,
    models::categories::{CategoryCreateDBRequest, CategoryDBResponse, CategoryFilter, CategoryUpdateDBRequest},
};
use crate::types::{CategoryId, abbrev_uuid};
use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::instrument;
use uuid::Uuid;

const CATEGORY_COLUMNS: &str = "id, name, default_minutes_low, default_minutes_high, active, created_at, updated_at";

pub struct Categories<'c> {
    db: &'c mut SqliteConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Categories<'c> {
    type CreateRequest = CategoryCreateDBRequest;
    type Response = CategoryDBResponse;
    type Id = CategoryId;
    type Filter = CategoryFilter;

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let now = Utc::now();
        let category = sqlx::query_as::<_, CategoryDBResponse>(&format!(
            "INSERT INTO categories (id, name, default_minutes_low, default_minutes_high, active, created_at, updated_at) \
             VALUES (?, ?, ?, ?, 1, ?, ?) RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&request.name)
        .bind(request.default_minutes_low)
        .bind(request.default_minutes_high)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(category)
    }

    #[instrument(skip(self), fields(category_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let category =
            sqlx::query_as::<_, CategoryDBResponse>(&format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?"))
                .bind(id)
                .fetch_optional(&mut *self.db)
                .await?;

        Ok(category)
    }

    /// Categories by name
    #[instrument(skip(self, filter), fields(active_only = filter.active_only), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let sql = if filter.active_only {
            format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE active = 1 ORDER BY name ASC")
        } else {
            format!("SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY name ASC")
        };

        let categories = sqlx::query_as::<_, CategoryDBResponse>(&sql)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(categories)
    }
}

impl<'c> Categories<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    /// Insert unless a category with this name exists. Returns whether a row was written.
    #[instrument(skip(self, request), fields(name = %request.name), err)]
    pub async fn insert_if_absent(&mut self, request: &CategoryCreateDBRequest) -> Result<bool> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO categories (id, name, default_minutes_low, default_minutes_high, active, created_at, updated_at) \
             VALUES (?, ?, ?, ?, 1, ?, ?) ON CONFLICT (name) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(&request.name)
        .bind(request.default_minutes_low)
        .bind(request.default_minutes_high)
        .bind(now)
        .bind(now)
        .execute(&mut *self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Apply a partial update. Returns `None` when no category has this id.
    #[instrument(skip(self, request), fields(category_id = %abbrev_uuid(&id)), err)]
    pub async fn update(&mut self, id: CategoryId, request: &CategoryUpdateDBRequest) -> Result<Option<CategoryDBResponse>> {
        let category = sqlx::query_as::<_, CategoryDBResponse>(&format!(
            r#"
            UPDATE categories SET
                default_minutes_low = COALESCE(?, default_minutes_low),
                default_minutes_high = COALESCE(?, default_minutes_high),
                active = CASE WHEN ? THEN NOT active ELSE active END,
                updated_at = ?
            WHERE id = ?
            RETURNING {CATEGORY_COLUMNS}
            "#
        ))
        .bind(request.default_minutes_low)
        .bind(request.default_minutes_high)
        .bind(request.toggle_active)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::SqlitePool;

    fn request(name: &str, low: i64, high: i64) -> CategoryCreateDBRequest {
        CategoryCreateDBRequest {
            name: name.to_string(),
            default_minutes_low: low,
            default_minutes_high: high,
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_insert_if_absent_keeps_existing_row(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Categories::new(&mut conn);

        assert!(repo.insert_if_absent(&request("Draft first reply", 5, 12)).await.unwrap());
        assert!(!repo.insert_if_absent(&request("Draft first reply", 1, 2)).await.unwrap());

        let all = repo.list(&CategoryFilter::default()).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].default_minutes_low, 5);
        assert_eq!(all[0].default_minutes_high, 12);
        assert!(all[0].active);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_partial_update_and_toggle(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Categories::new(&mut conn);
        let created = repo.create(&request("Escalation summary for Tier 2", 5, 10)).await.unwrap();

        let updated = repo
            .update(
                created.id,
                &CategoryUpdateDBRequest {
                    default_minutes_low: Some(6),
                    default_minutes_high: None,
                    toggle_active: true,
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.default_minutes_low, 6);
        assert_eq!(updated.default_minutes_high, 10);
        assert!(!updated.active);

        let active = repo.list(&CategoryFilter::active()).await.unwrap();
        assert!(active.is_empty());

        let toggled_back = repo
            .update(
                created.id,
                &CategoryUpdateDBRequest {
                    toggle_active: true,
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert!(toggled_back.active);
        assert_eq!(toggled_back.default_minutes_low, 6);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_unknown_category_is_none(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Categories::new(&mut conn);

        let result = repo.update(Uuid::new_v4(), &CategoryUpdateDBRequest::default()).await.unwrap();
        assert!(result.is_none());
    }
}

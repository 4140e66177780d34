//! Database repository for key/value settings.

use crate::db::{
    errors::Result,
    models::settings::{BLENDED_HOURLY_RATE_KEY, SettingDBResponse, parse_rate},
};
use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::instrument;

pub struct Settings<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Settings<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self), err)]
    pub async fn get(&mut self, key: &str) -> Result<Option<SettingDBResponse>> {
        let setting = sqlx::query_as::<_, SettingDBResponse>("SELECT key, value, updated_at FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(setting)
    }

    #[instrument(skip(self), err)]
    pub async fn set(&mut self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO settings (key, value, updated_at) VALUES (?, ?, ?) \
             ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&mut *self.db)
        .await?;

        Ok(())
    }

    /// Returns whether a row was written.
    #[instrument(skip(self), err)]
    pub async fn insert_if_absent(&mut self, key: &str, value: &str) -> Result<bool> {
        let result =
            sqlx::query("INSERT INTO settings (key, value, updated_at) VALUES (?, ?, ?) ON CONFLICT (key) DO NOTHING")
                .bind(key)
                .bind(value)
                .bind(Utc::now())
                .execute(&mut *self.db)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Current blended hourly rate. Read on every call, never cached.
    pub async fn blended_hourly_rate(&mut self) -> Result<f64> {
        let setting = self.get(BLENDED_HOURLY_RATE_KEY).await?;
        Ok(parse_rate(setting.as_ref().map(|s| s.value.as_str())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::settings::FALLBACK_HOURLY_RATE;
    use sqlx::SqlitePool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_rate_falls_back_when_absent_or_garbage(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Settings::new(&mut conn);

        assert_eq!(repo.blended_hourly_rate().await.unwrap(), FALLBACK_HOURLY_RATE);

        repo.set(BLENDED_HOURLY_RATE_KEY, "not a number").await.unwrap();
        assert_eq!(repo.blended_hourly_rate().await.unwrap(), FALLBACK_HOURLY_RATE);

        repo.set(BLENDED_HOURLY_RATE_KEY, "35.5").await.unwrap();
        assert_eq!(repo.blended_hourly_rate().await.unwrap(), 35.5);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_insert_if_absent_keeps_admin_value(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Settings::new(&mut conn);

        repo.set(BLENDED_HOURLY_RATE_KEY, "42").await.unwrap();
        assert!(!repo.insert_if_absent(BLENDED_HOURLY_RATE_KEY, "20").await.unwrap());
        assert_eq!(repo.get(BLENDED_HOURLY_RATE_KEY).await.unwrap().unwrap().value, "42");
    }
}

use crate::{api::error, modules::license::repository::SettingsRepository};

#[derive(Clone)]
pub struct SettingsRepositoryPg {
    pool: sqlx::PgPool,
}

impl SettingsRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl SettingsRepository for SettingsRepositoryPg {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, error::SystemError> {
        let value = sqlx::query_scalar::<_, serde_json::Value>(
            "SELECT value FROM system_settings WHERE key = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(value)
    }

    async fn set(&self, key: &str, value: &serde_json::Value) -> Result<(), error::SystemError> {
        sqlx::query(
            r#"
            INSERT INTO system_settings (key, value, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (key) DO UPDATE
            SET value = EXCLUDED.value, updated_at = NOW()
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

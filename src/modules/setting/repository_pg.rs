use crate::{
    api::error,
    modules::setting::{repository::SettingRepository, schema::SettingEntity},
};

#[derive(Clone)]
pub struct SettingRepositoryPg {
    pool: sqlx::PgPool,
}

impl SettingRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl SettingRepository for SettingRepositoryPg {
    async fn get(&self, key: &str) -> Result<Option<String>, error::SystemError> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM settings WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    async fn all(&self) -> Result<Vec<SettingEntity>, error::SystemError> {
        let rows = sqlx::query_as::<_, SettingEntity>(
            "SELECT key, value, updated_at FROM settings ORDER BY key",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn upsert(&self, key: &str, value: &str) -> Result<(), error::SystemError> {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (key)
            DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

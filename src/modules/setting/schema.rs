use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SettingEntity {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

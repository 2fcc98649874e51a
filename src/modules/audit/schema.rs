use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};

#[derive(Debug, PartialEq, Eq, Clone, Copy, Type, Serialize, Deserialize)]
#[sqlx(type_name = "log_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LogCategory {
    Auth,
    File,
    User,
    Admin,
    Security,
    System,
}

/// Audit row joined with the acting user's name. `user_id` and `username`
/// outlive the account itself (nullable reference), keeping history intact.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntryRow {
    pub id: i64,
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub ip: String,
    pub action: String,
    pub details: String,
    pub category: LogCategory,
    pub resource_id: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::modules::audit::schema::{LogCategory, LogEntryRow};

/// A ledger entry about to be appended. Built where the event happens,
/// carried to the repository unchanged.
#[derive(Debug, Clone)]
pub struct NewLogEntry {
    pub user_id: Option<i64>,
    pub ip: String,
    pub action: String,
    pub details: String,
    pub category: LogCategory,
    pub resource_id: Option<i64>,
}

impl NewLogEntry {
    pub fn new(category: LogCategory, action: impl Into<String>, ip: impl Into<String>) -> Self {
        NewLogEntry {
            user_id: None,
            ip: ip.into(),
            action: action.into(),
            details: String::new(),
            category,
            resource_id: None,
        }
    }

    pub fn user(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }

    pub fn resource(mut self, resource_id: i64) -> Self {
        self.resource_id = Some(resource_id);
        self
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LogQueryModel {
    pub category: Option<LogCategory>,
    pub user_id: Option<i64>,
    pub from: Option<chrono::DateTime<chrono::Utc>>,
    pub to: Option<chrono::DateTime<chrono::Utc>>,
    #[validate(length(max = 200, message = "Search term too long"))]
    pub search: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

/// Normalized filter handed to the repository; page/sort already validated.
#[derive(Debug, Clone)]
pub struct LogFilter {
    pub category: Option<LogCategory>,
    pub user_id: Option<i64>,
    pub from: Option<chrono::DateTime<chrono::Utc>>,
    pub to: Option<chrono::DateTime<chrono::Utc>>,
    pub search: Option<String>,
    pub limit: i64,
    pub offset: i64,
    pub sort_column: &'static str,
    pub ascending: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogPage {
    pub entries: Vec<LogEntryRow>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
}

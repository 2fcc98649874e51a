use serde::Serialize;

/// Every tunable with its default applied, as served to the admin panel.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveSettings {
    pub file_size_limit_mb: u64,
    pub storage_quota_mb: u64,
    pub allowed_file_types: String,
    pub maintenance_mode: bool,
    pub session_timeout_minutes: i64,
    pub password_min_length: u32,
    pub password_expiry_days: u32,
}

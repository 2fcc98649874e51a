use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use chrono::Duration;

use crate::api::error::{self, SystemError};
use crate::modules::audit::{model::NewLogEntry, schema::LogCategory, service::AuditService};
use crate::modules::policy::{self, Action, Actor, PolicyContext, Resource};
use crate::modules::setting::{model::EffectiveSettings, repository::SettingRepository};
use crate::utils::ClientMeta;

/// Stored keys are camelCase because the admin panel round-trips them as-is.
pub mod keys {
    pub const FILE_SIZE_LIMIT_MB: &str = "fileSizeLimitMB";
    pub const STORAGE_QUOTA_MB: &str = "storageQuotaMB";
    pub const ALLOWED_FILE_TYPES: &str = "allowedFileTypes";
    pub const MAINTENANCE_MODE: &str = "maintenanceMode";
    pub const SESSION_TIMEOUT_MINUTES: &str = "sessionTimeoutMinutes";
    pub const PASSWORD_MIN_LENGTH: &str = "passwordMinLength";
    pub const PASSWORD_EXPIRY_DAYS: &str = "passwordExpiryDays";
}

const DEFAULT_FILE_SIZE_LIMIT_MB: u64 = 25;
const DEFAULT_STORAGE_QUOTA_MB: u64 = 0;
const DEFAULT_MAINTENANCE_MODE: bool = false;
const DEFAULT_SESSION_TIMEOUT_MINUTES: i64 = 60;
const DEFAULT_PASSWORD_MIN_LENGTH: u32 = 8;
const DEFAULT_PASSWORD_EXPIRY_DAYS: u32 = 0;

#[derive(Clone)]
pub struct SettingService {
    repo: Arc<dyn SettingRepository + Send + Sync>,
    audit: AuditService,
}

impl SettingService {
    pub fn with_dependencies(
        repo: Arc<dyn SettingRepository + Send + Sync>,
        audit: AuditService,
    ) -> Self {
        SettingService { repo, audit }
    }

    /// Maximum accepted upload size in bytes.
    pub async fn file_size_limit_bytes(&self) -> Result<u64, SystemError> {
        let mb = self.parsed_or_default(keys::FILE_SIZE_LIMIT_MB, DEFAULT_FILE_SIZE_LIMIT_MB).await?;
        Ok(mb * 1024 * 1024)
    }

    /// Per-owner storage cap in bytes. `None` means unlimited.
    pub async fn storage_quota_bytes(&self) -> Result<Option<u64>, SystemError> {
        let mb = self.parsed_or_default(keys::STORAGE_QUOTA_MB, DEFAULT_STORAGE_QUOTA_MB).await?;
        Ok((mb > 0).then_some(mb * 1024 * 1024))
    }

    /// Lowercased extension whitelist. `None` means every type is accepted.
    pub async fn allowed_extensions(&self) -> Result<Option<Vec<String>>, SystemError> {
        let raw = self.repo.get(keys::ALLOWED_FILE_TYPES).await?.unwrap_or_default();
        Ok(parse_extension_list(&raw))
    }

    pub async fn session_timeout(&self) -> Result<Duration, SystemError> {
        let minutes = self
            .parsed_or_default(keys::SESSION_TIMEOUT_MINUTES, DEFAULT_SESSION_TIMEOUT_MINUTES)
            .await?;
        Ok(Duration::minutes(minutes))
    }

    pub async fn password_min_length(&self) -> Result<u32, SystemError> {
        self.parsed_or_default(keys::PASSWORD_MIN_LENGTH, DEFAULT_PASSWORD_MIN_LENGTH).await
    }

    /// Password age after which logins flag a required change. `None` means never.
    pub async fn password_expiry(&self) -> Result<Option<Duration>, SystemError> {
        let days = self
            .parsed_or_default(keys::PASSWORD_EXPIRY_DAYS, DEFAULT_PASSWORD_EXPIRY_DAYS)
            .await?;
        Ok((days > 0).then(|| Duration::days(i64::from(days))))
    }

    /// Fresh policy inputs for the current request. Read per call so a flipped
    /// maintenance switch takes effect without a restart.
    pub async fn policy_context(&self) -> Result<PolicyContext, SystemError> {
        let maintenance_mode = self
            .parsed_or_default(keys::MAINTENANCE_MODE, DEFAULT_MAINTENANCE_MODE)
            .await?;
        Ok(PolicyContext { maintenance_mode })
    }

    pub async fn effective_for(
        &self,
        ctx: PolicyContext,
        actor: &Actor,
        meta: &ClientMeta,
    ) -> Result<EffectiveSettings, SystemError> {
        if let Err(reason) =
            policy::authorize(ctx, Some(actor), &Resource::Settings, Action::Read).require()
        {
            self.audit.denied(Some(actor), meta, "settings_read", None, reason).await;
            return Err(reason.into_error());
        }
        self.effective().await
    }

    /// Validate every submitted pair before writing any of them, then upsert
    /// and record which keys changed.
    pub async fn update_for(
        &self,
        ctx: PolicyContext,
        actor: &Actor,
        meta: &ClientMeta,
        changes: HashMap<String, String>,
    ) -> Result<EffectiveSettings, SystemError> {
        if let Err(reason) =
            policy::authorize(ctx, Some(actor), &Resource::Settings, Action::ManageSettings)
                .require()
        {
            self.audit.denied(Some(actor), meta, "settings_update", None, reason).await;
            return Err(reason.into_error());
        }
        if changes.is_empty() {
            return Err(error::SystemError::validation("No settings provided"));
        }

        for (key, value) in &changes {
            validate_setting(key, value)?;
        }

        let mut updated: Vec<&str> = Vec::with_capacity(changes.len());
        for (key, value) in &changes {
            self.repo.upsert(key, value.trim()).await?;
            updated.push(key);
        }
        updated.sort_unstable();

        self.audit
            .append(
                NewLogEntry::new(LogCategory::Admin, "settings_update", &meta.ip)
                    .user(actor.id)
                    .details(format!("updated keys: {}", updated.join(", "))),
            )
            .await;

        self.effective().await
    }

    async fn effective(&self) -> Result<EffectiveSettings, SystemError> {
        let stored: HashMap<String, String> = self
            .repo
            .all()
            .await?
            .into_iter()
            .map(|s| (s.key, s.value))
            .collect();

        Ok(EffectiveSettings {
            file_size_limit_mb: stored_or_default(
                &stored,
                keys::FILE_SIZE_LIMIT_MB,
                DEFAULT_FILE_SIZE_LIMIT_MB,
            ),
            storage_quota_mb: stored_or_default(
                &stored,
                keys::STORAGE_QUOTA_MB,
                DEFAULT_STORAGE_QUOTA_MB,
            ),
            allowed_file_types: stored
                .get(keys::ALLOWED_FILE_TYPES)
                .cloned()
                .unwrap_or_default(),
            maintenance_mode: stored_or_default(
                &stored,
                keys::MAINTENANCE_MODE,
                DEFAULT_MAINTENANCE_MODE,
            ),
            session_timeout_minutes: stored_or_default(
                &stored,
                keys::SESSION_TIMEOUT_MINUTES,
                DEFAULT_SESSION_TIMEOUT_MINUTES,
            ),
            password_min_length: stored_or_default(
                &stored,
                keys::PASSWORD_MIN_LENGTH,
                DEFAULT_PASSWORD_MIN_LENGTH,
            ),
            password_expiry_days: stored_or_default(
                &stored,
                keys::PASSWORD_EXPIRY_DAYS,
                DEFAULT_PASSWORD_EXPIRY_DAYS,
            ),
        })
    }

    async fn parsed_or_default<T: FromStr>(&self, key: &str, default: T) -> Result<T, SystemError> {
        match self.repo.get(key).await? {
            Some(raw) => match raw.trim().parse() {
                Ok(value) => Ok(value),
                Err(_) => {
                    log::warn!("Setting '{key}' holds unparsable value '{raw}', using default");
                    Ok(default)
                }
            },
            None => Ok(default),
        }
    }
}

fn stored_or_default<T: FromStr + Copy>(store: &HashMap<String, String>, key: &str, default: T) -> T {
    store
        .get(key)
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(default)
}

/// Empty input means no restriction. Tokens are trimmed, lowercased and
/// deduplicated; a lone comma list of blanks collapses to no restriction too.
pub fn parse_extension_list(raw: &str) -> Option<Vec<String>> {
    let mut extensions: Vec<String> = raw
        .split(',')
        .map(|token| token.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|token| !token.is_empty())
        .collect();
    extensions.sort_unstable();
    extensions.dedup();
    (!extensions.is_empty()).then_some(extensions)
}

pub fn validate_setting(key: &str, value: &str) -> Result<(), SystemError> {
    let value = value.trim();
    match key {
        keys::FILE_SIZE_LIMIT_MB => {
            parse_ranged::<u64>(key, value, 1, 10_240)?;
        }
        keys::STORAGE_QUOTA_MB => {
            parse_ranged::<u64>(key, value, 0, 1_048_576)?;
        }
        keys::ALLOWED_FILE_TYPES => {
            let valid = value.split(',').all(|token| {
                let token = token.trim().trim_start_matches('.');
                token.len() <= 16 && token.chars().all(|c| c.is_ascii_alphanumeric())
            });
            if !valid {
                return Err(error::SystemError::validation(format!(
                    "'{key}' must be a comma separated list of extensions"
                )));
            }
        }
        keys::MAINTENANCE_MODE => {
            if value.parse::<bool>().is_err() {
                return Err(error::SystemError::validation(format!(
                    "'{key}' must be true or false"
                )));
            }
        }
        keys::SESSION_TIMEOUT_MINUTES => {
            parse_ranged::<i64>(key, value, 1, 43_200)?;
        }
        keys::PASSWORD_MIN_LENGTH => {
            parse_ranged::<u32>(key, value, 4, 128)?;
        }
        keys::PASSWORD_EXPIRY_DAYS => {
            parse_ranged::<u32>(key, value, 0, 3_650)?;
        }
        other => {
            return Err(error::SystemError::validation(format!(
                "Unknown setting '{other}'"
            )));
        }
    }
    Ok(())
}

fn parse_ranged<T>(key: &str, value: &str, min: T, max: T) -> Result<T, SystemError>
where
    T: FromStr + PartialOrd + std::fmt::Display + Copy,
{
    let parsed: T = value.parse().map_err(|_| {
        error::SystemError::validation(format!("'{key}' must be a number"))
    })?;
    if parsed < min || parsed > max {
        return Err(error::SystemError::validation(format!(
            "'{key}' must be between {min} and {max}"
        )));
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_list_is_normalized() {
        assert_eq!(
            parse_extension_list(" PNG, .pdf , png ,docx"),
            Some(vec!["docx".to_string(), "pdf".to_string(), "png".to_string()])
        );
    }

    #[test]
    fn blank_extension_list_means_no_restriction() {
        assert_eq!(parse_extension_list(""), None);
        assert_eq!(parse_extension_list("  , ,  "), None);
    }

    #[test]
    fn known_keys_accept_valid_values() {
        assert!(validate_setting(keys::FILE_SIZE_LIMIT_MB, "25").is_ok());
        assert!(validate_setting(keys::STORAGE_QUOTA_MB, "0").is_ok());
        assert!(validate_setting(keys::ALLOWED_FILE_TYPES, "png,pdf,docx").is_ok());
        assert!(validate_setting(keys::ALLOWED_FILE_TYPES, "").is_ok());
        assert!(validate_setting(keys::MAINTENANCE_MODE, "true").is_ok());
        assert!(validate_setting(keys::SESSION_TIMEOUT_MINUTES, "60").is_ok());
        assert!(validate_setting(keys::PASSWORD_MIN_LENGTH, "12").is_ok());
        assert!(validate_setting(keys::PASSWORD_EXPIRY_DAYS, "90").is_ok());
    }

    #[test]
    fn out_of_range_and_malformed_values_are_rejected() {
        assert!(validate_setting(keys::FILE_SIZE_LIMIT_MB, "0").is_err());
        assert!(validate_setting(keys::FILE_SIZE_LIMIT_MB, "lots").is_err());
        assert!(validate_setting(keys::MAINTENANCE_MODE, "yes").is_err());
        assert!(validate_setting(keys::SESSION_TIMEOUT_MINUTES, "-5").is_err());
        assert!(validate_setting(keys::PASSWORD_MIN_LENGTH, "2").is_err());
        assert!(validate_setting(keys::ALLOWED_FILE_TYPES, "png,../etc").is_err());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            validate_setting("adminBackdoor", "on"),
            Err(SystemError::Validation(_))
        ));
    }
}

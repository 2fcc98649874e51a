use std::sync::Arc;

use chrono::Utc;
use log::info;

use crate::api::error;
use crate::modules::audit::{model::NewLogEntry, schema::LogCategory, service::AuditService};
use crate::modules::auth::model::{ChangePasswordModel, LoginModel, NewSession, SessionUserModel};
use crate::modules::auth::repository::SessionRepository;
use crate::modules::policy::{self, Action, Actor, PolicyContext, Resource};
use crate::modules::setting::service::SettingService;
use crate::modules::user::{
    repository::UserRepository,
    schema::{UserEntity, UserStatus},
};
use crate::utils::{self, ClientMeta};

#[derive(Clone)]
pub struct AuthService {
    sessions: Arc<dyn SessionRepository + Send + Sync>,
    users: Arc<dyn UserRepository + Send + Sync>,
    settings: SettingService,
    audit: AuditService,
}

impl AuthService {
    pub fn with_dependencies(
        sessions: Arc<dyn SessionRepository + Send + Sync>,
        users: Arc<dyn UserRepository + Send + Sync>,
        settings: SettingService,
        audit: AuditService,
    ) -> Self {
        AuthService { sessions, users, settings, audit }
    }

    /// Verify credentials and mint a session token. Failed attempts land in
    /// the ledger before the error leaves this function.
    pub async fn login(
        &self,
        ctx: PolicyContext,
        model: LoginModel,
        meta: &ClientMeta,
    ) -> Result<(SessionUserModel, String), error::SystemError> {
        let Some(user) = self.users.find_by_username(&model.username).await? else {
            self.audit
                .append(
                    NewLogEntry::new(LogCategory::Auth, "login_failed", &meta.ip)
                        .details(format!("unknown username '{}'", model.username)),
                )
                .await;
            return Err(error::SystemError::InvalidCredentials);
        };

        if !utils::verify_password(&user.password_hash, &model.password) {
            self.audit
                .append(
                    NewLogEntry::new(LogCategory::Auth, "login_failed", &meta.ip)
                        .user(user.id)
                        .details("wrong password"),
                )
                .await;
            return Err(error::SystemError::InvalidCredentials);
        }

        if user.status == UserStatus::Inactive {
            self.audit
                .append(
                    NewLogEntry::new(LogCategory::Auth, "login_failed", &meta.ip)
                        .user(user.id)
                        .details("account is inactive"),
                )
                .await;
            return Err(error::SystemError::AccountInactive);
        }

        let candidate = Actor { id: user.id, role: user.role };
        if let Err(reason) =
            policy::authorize(ctx, Some(&candidate), &Resource::System, Action::Login).require()
        {
            self.audit.denied(Some(&candidate), meta, "login", None, reason).await;
            return Err(reason.into_error());
        }

        let timeout = self.settings.session_timeout().await?;
        let session = NewSession {
            token: utils::generate_session_token(),
            user_id: user.id,
            ip: meta.ip.clone(),
            user_agent: meta.user_agent.clone(),
            expires_at: Utc::now() + timeout,
        };
        self.sessions.insert(&session).await?;

        let password_expired = self.password_expired(&user).await?;
        self.audit
            .append(
                NewLogEntry::new(LogCategory::Auth, "login", &meta.ip)
                    .user(user.id)
                    .details(format!("username '{}'", user.username)),
            )
            .await;
        info!("User '{}' logged in", user.username);

        Ok((SessionUserModel::from_entity(&user, password_expired), session.token))
    }

    /// Idempotent: logging out an already dead session still succeeds.
    pub async fn logout(
        &self,
        user_id: i64,
        token: &str,
        meta: &ClientMeta,
    ) -> Result<(), error::SystemError> {
        self.sessions.delete(token).await?;
        self.audit
            .append(NewLogEntry::new(LogCategory::Auth, "logout", &meta.ip).user(user_id))
            .await;
        Ok(())
    }

    /// Turn a bearer token into its user, or `None` for anything that must
    /// not authenticate. Expired rows are reaped here on first sight rather
    /// than by a background job.
    pub async fn resolve_session(
        &self,
        token: &str,
    ) -> Result<Option<UserEntity>, error::SystemError> {
        let Some(row) = self.sessions.find_with_user(token).await? else {
            return Ok(None);
        };

        if row.expires_at <= Utc::now() {
            self.sessions.delete(token).await?;
            return Ok(None);
        }

        let user = row.into_user();
        if user.status == UserStatus::Inactive {
            return Ok(None);
        }

        self.sessions.touch(token).await?;
        Ok(Some(user))
    }

    pub async fn me(&self, user_id: i64) -> Result<SessionUserModel, error::SystemError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("User not found"))?;
        let password_expired = self.password_expired(&user).await?;
        Ok(SessionUserModel::from_entity(&user, password_expired))
    }

    /// Self-service password change. Every other session of the user is
    /// revoked; the one presenting this request stays alive.
    pub async fn change_password(
        &self,
        user_id: i64,
        model: ChangePasswordModel,
        keep_token: &str,
        meta: &ClientMeta,
    ) -> Result<(), error::SystemError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("User not found"))?;

        if !utils::verify_password(&user.password_hash, &model.current_password) {
            self.audit
                .append(
                    NewLogEntry::new(LogCategory::Auth, "password_change_failed", &meta.ip)
                        .user(user.id)
                        .details("current password mismatch"),
                )
                .await;
            return Err(error::SystemError::InvalidCredentials);
        }

        let min_length = self.settings.password_min_length().await?;
        if (model.new_password.chars().count() as u32) < min_length {
            return Err(error::SystemError::validation(format!(
                "Password must be at least {min_length} characters"
            )));
        }

        let hash = utils::hash_password(&model.new_password)?;
        self.users.update_password(user.id, &hash).await?;
        let revoked = self.sessions.delete_for_user(user.id, Some(keep_token)).await?;

        self.audit
            .append(
                NewLogEntry::new(LogCategory::Auth, "password_change", &meta.ip)
                    .user(user.id)
                    .details(format!("revoked {revoked} other sessions")),
            )
            .await;
        Ok(())
    }

    async fn password_expired(&self, user: &UserEntity) -> Result<bool, error::SystemError> {
        Ok(match self.settings.password_expiry().await? {
            Some(max_age) => user.password_changed_at + max_age <= Utc::now(),
            None => false,
        })
    }
}

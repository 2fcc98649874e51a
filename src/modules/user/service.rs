use log::info;
use std::sync::Arc;

use crate::api::error;
use crate::modules::audit::{model::NewLogEntry, schema::LogCategory, service::AuditService};
use crate::modules::auth::repository::SessionRepository;
use crate::modules::policy::{self, Action, Actor, PolicyContext, Resource, UserRef};
use crate::modules::setting::service::SettingService;
use crate::modules::user::model::{CreateUserModel, InsertUser, UserModel};
use crate::modules::user::repository::UserRepository;
use crate::modules::user::schema::{UserEntity, UserRole, UserStatus};
use crate::utils::{self, ClientMeta};
use crate::ENV;

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository + Send + Sync>,
    sessions: Arc<dyn SessionRepository + Send + Sync>,
    settings: SettingService,
    audit: AuditService,
}

impl UserService {
    pub fn with_dependencies(
        repo: Arc<dyn UserRepository + Send + Sync>,
        sessions: Arc<dyn SessionRepository + Send + Sync>,
        settings: SettingService,
        audit: AuditService,
    ) -> Self {
        info!("UserService initialized with dependencies");
        UserService { repo, sessions, settings, audit }
    }

    /// Guarantee one admin exists on a fresh database. Does nothing once any
    /// admin account is present, so a renamed or re-passworded seed admin is
    /// never recreated or overwritten.
    pub async fn seed_admin(&self) -> Result<(), error::SystemError> {
        if self.repo.admin_exists().await? {
            return Ok(());
        }

        let insert = InsertUser {
            username: ENV.seed_admin_username.clone(),
            email: ENV.seed_admin_email.clone(),
            password_hash: utils::hash_password(&ENV.seed_admin_password)?,
            role: UserRole::Admin,
            is_seed_admin: true,
        };
        let user = self.repo.insert(&insert).await?;

        self.audit
            .append(
                NewLogEntry::new(LogCategory::System, "seed_admin", "system")
                    .resource(user.id)
                    .details(format!("created admin '{}'", user.username)),
            )
            .await;
        info!("Seed admin '{}' created", user.username);
        Ok(())
    }

    pub async fn create_user(
        &self,
        ctx: PolicyContext,
        actor: &Actor,
        meta: &ClientMeta,
        model: CreateUserModel,
    ) -> Result<UserModel, error::SystemError> {
        if let Err(reason) =
            policy::authorize(ctx, Some(actor), &Resource::System, Action::CreateUser).require()
        {
            self.audit.denied(Some(actor), meta, "user_create", None, reason).await;
            return Err(reason.into_error());
        }

        let min_length = self.settings.password_min_length().await?;
        if (model.password.chars().count() as u32) < min_length {
            return Err(error::SystemError::validation(format!(
                "Password must be at least {min_length} characters"
            )));
        }

        let role = model.role.unwrap_or(UserRole::User);
        let insert = InsertUser {
            username: model.username.trim().to_string(),
            email: model.email.trim().to_string(),
            password_hash: utils::hash_password(&model.password)?,
            role,
            is_seed_admin: false,
        };
        let user = self.repo.insert(&insert).await?;

        self.audit
            .append(
                NewLogEntry::new(LogCategory::User, "user_create", &meta.ip)
                    .user(actor.id)
                    .resource(user.id)
                    .details(format!("username '{}', role {}", user.username, role.as_str())),
            )
            .await;

        Ok(UserModel::from(user))
    }

    pub async fn list_users(
        &self,
        ctx: PolicyContext,
        actor: &Actor,
        meta: &ClientMeta,
    ) -> Result<Vec<UserModel>, error::SystemError> {
        if let Err(reason) =
            policy::authorize(ctx, Some(actor), &Resource::System, Action::ListUsers).require()
        {
            self.audit.denied(Some(actor), meta, "user_list", None, reason).await;
            return Err(reason.into_error());
        }

        let users = self.repo.list().await?;
        Ok(users.into_iter().map(UserModel::from).collect())
    }

    /// Demotions of the seed admin or of the caller themselves never reach
    /// the repository; the rules reject them first.
    pub async fn update_role(
        &self,
        ctx: PolicyContext,
        actor: &Actor,
        meta: &ClientMeta,
        target_id: i64,
        role: UserRole,
    ) -> Result<UserModel, error::SystemError> {
        let target = self.require_user(target_id).await?;

        if let Err(reason) = policy::authorize(
            ctx,
            Some(actor),
            &Resource::User(UserRef::from(&target)),
            Action::UpdateRole { to: role },
        )
        .require()
        {
            self.audit.denied(Some(actor), meta, "user_role", Some(target_id), reason).await;
            return Err(reason.into_error());
        }

        if target.role == role {
            return Ok(UserModel::from(target));
        }

        let updated = self
            .repo
            .update_role(target_id, role)
            .await?
            .ok_or_else(|| error::SystemError::not_found("User not found"))?;

        self.audit
            .append(
                NewLogEntry::new(LogCategory::User, "user_role", &meta.ip)
                    .user(actor.id)
                    .resource(updated.id)
                    .details(format!("'{}' set to {}", updated.username, role.as_str())),
            )
            .await;

        Ok(UserModel::from(updated))
    }

    /// Deactivation revokes every session of the target immediately.
    pub async fn update_status(
        &self,
        ctx: PolicyContext,
        actor: &Actor,
        meta: &ClientMeta,
        target_id: i64,
        status: UserStatus,
    ) -> Result<UserModel, error::SystemError> {
        let target = self.require_user(target_id).await?;

        if let Err(reason) = policy::authorize(
            ctx,
            Some(actor),
            &Resource::User(UserRef::from(&target)),
            Action::UpdateStatus,
        )
        .require()
        {
            self.audit.denied(Some(actor), meta, "user_status", Some(target_id), reason).await;
            return Err(reason.into_error());
        }

        if target.status == status {
            return Ok(UserModel::from(target));
        }

        let updated = self
            .repo
            .update_status(target_id, status)
            .await?
            .ok_or_else(|| error::SystemError::not_found("User not found"))?;

        let mut details = format!("'{}' set to {}", updated.username, status.as_str());
        if status == UserStatus::Inactive {
            let revoked = self.sessions.delete_for_user(target_id, None).await?;
            details.push_str(&format!(", revoked {revoked} sessions"));
        }

        self.audit
            .append(
                NewLogEntry::new(LogCategory::User, "user_status", &meta.ip)
                    .user(actor.id)
                    .resource(updated.id)
                    .details(details),
            )
            .await;

        Ok(UserModel::from(updated))
    }

    /// Admin reset: no current-password proof, but every session of the
    /// target dies with the old credential.
    pub async fn reset_password(
        &self,
        ctx: PolicyContext,
        actor: &Actor,
        meta: &ClientMeta,
        target_id: i64,
        new_password: &str,
    ) -> Result<(), error::SystemError> {
        let target = self.require_user(target_id).await?;

        if let Err(reason) = policy::authorize(
            ctx,
            Some(actor),
            &Resource::User(UserRef::from(&target)),
            Action::ResetPassword,
        )
        .require()
        {
            self.audit.denied(Some(actor), meta, "user_password_reset", Some(target_id), reason).await;
            return Err(reason.into_error());
        }

        let min_length = self.settings.password_min_length().await?;
        if (new_password.chars().count() as u32) < min_length {
            return Err(error::SystemError::validation(format!(
                "Password must be at least {min_length} characters"
            )));
        }

        let hash = utils::hash_password(new_password)?;
        if !self.repo.update_password(target_id, &hash).await? {
            return Err(error::SystemError::not_found("User not found"));
        }
        let revoked = self.sessions.delete_for_user(target_id, None).await?;

        self.audit
            .append(
                NewLogEntry::new(LogCategory::User, "user_password_reset", &meta.ip)
                    .user(actor.id)
                    .resource(target_id)
                    .details(format!("'{}', revoked {revoked} sessions", target.username)),
            )
            .await;

        Ok(())
    }

    /// Sessions are revoked before the row goes away; the files the user
    /// owned stay in the catalog with no owner.
    pub async fn delete_user(
        &self,
        ctx: PolicyContext,
        actor: &Actor,
        meta: &ClientMeta,
        target_id: i64,
    ) -> Result<(), error::SystemError> {
        let target = self.require_user(target_id).await?;

        if let Err(reason) = policy::authorize(
            ctx,
            Some(actor),
            &Resource::User(UserRef::from(&target)),
            Action::DeleteUser,
        )
        .require()
        {
            self.audit.denied(Some(actor), meta, "user_delete", Some(target_id), reason).await;
            return Err(reason.into_error());
        }

        let revoked = self.sessions.delete_for_user(target_id, None).await?;
        if !self.repo.delete(target_id).await? {
            return Err(error::SystemError::not_found("User not found"));
        }

        self.audit
            .append(
                NewLogEntry::new(LogCategory::User, "user_delete", &meta.ip)
                    .user(actor.id)
                    .resource(target_id)
                    .details(format!("'{}', revoked {revoked} sessions", target.username)),
            )
            .await;

        Ok(())
    }

    async fn require_user(&self, id: i64) -> Result<UserEntity, error::SystemError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("User not found"))
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::modules::user::schema::{UserEntity, UserRole, UserStatus};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserModel {
    #[validate(length(min = 3, max = 32, message = "Username must be 3 to 32 characters long"))]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    /// Minimum length comes from the passwordMinLength setting, enforced in
    /// the service.
    #[validate(length(min = 1, max = 200, message = "Password is required"))]
    pub password: String,
    pub role: Option<UserRole>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleModel {
    pub role: UserRole,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusModel {
    pub status: UserStatus,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordModel {
    #[validate(length(min = 1, max = 200, message = "New password is required"))]
    pub new_password: String,
}

pub struct InsertUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub is_seed_admin: bool,
}

/// Account as listed in the admin panel. `is_seed_admin` is exposed so the
/// panel can grey out the protections.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserModel {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub is_seed_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl From<UserEntity> for UserModel {
    fn from(entity: UserEntity) -> Self {
        UserModel {
            id: entity.id,
            username: entity.username,
            email: entity.email,
            role: entity.role,
            status: entity.status,
            is_seed_admin: entity.is_seed_admin,
            created_at: entity.created_at,
        }
    }
}

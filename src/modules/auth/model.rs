use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::modules::user::schema::{UserEntity, UserRole, UserStatus};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginModel {
    #[validate(length(min = 1, max = 100, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, max = 200, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordModel {
    #[validate(length(min = 1, max = 200, message = "Current password is required"))]
    pub current_password: String,
    #[validate(length(min = 1, max = 200, message = "New password is required"))]
    pub new_password: String,
}

/// The authenticated identity as returned by login and `/auth/me`. The
/// password hash never leaves the service layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUserModel {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub password_expired: bool,
    pub created_at: DateTime<Utc>,
}

impl SessionUserModel {
    pub fn from_entity(user: &UserEntity, password_expired: bool) -> Self {
        SessionUserModel {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            status: user.status,
            password_expired,
            created_at: user.created_at,
        }
    }
}

/// Row values for a freshly issued session.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub token: String,
    pub user_id: i64,
    pub ip: String,
    pub user_agent: String,
    pub expires_at: DateTime<Utc>,
}

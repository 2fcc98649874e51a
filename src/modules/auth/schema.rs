use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::modules::user::schema::{UserEntity, UserRole, UserStatus};

/// Session joined onto its owning user. Orphaned rows (owner deleted) never
/// match the inner join, so they cannot authenticate.
#[derive(Debug, Clone, FromRow)]
pub struct SessionUserRow {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub is_seed_admin: bool,
    pub password_changed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionUserRow {
    pub fn into_user(self) -> UserEntity {
        UserEntity {
            id: self.id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            role: self.role,
            status: self.status,
            is_seed_admin: self.is_seed_admin,
            password_changed_at: self.password_changed_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

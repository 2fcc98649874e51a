use crate::{
    api::error,
    modules::user::model::InsertUser,
    modules::user::schema::{UserEntity, UserRole, UserStatus},
};

#[async_trait::async_trait]
pub trait UserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<UserEntity>, error::SystemError>;

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserEntity>, error::SystemError>;

    async fn insert(&self, user: &InsertUser) -> Result<UserEntity, error::SystemError>;

    async fn list(&self) -> Result<Vec<UserEntity>, error::SystemError>;

    async fn update_role(
        &self,
        id: i64,
        role: UserRole,
    ) -> Result<Option<UserEntity>, error::SystemError>;

    async fn update_status(
        &self,
        id: i64,
        status: UserStatus,
    ) -> Result<Option<UserEntity>, error::SystemError>;

    /// Also restarts the password age clock.
    async fn update_password(
        &self,
        id: i64,
        password_hash: &str,
    ) -> Result<bool, error::SystemError>;

    async fn delete(&self, id: i64) -> Result<bool, error::SystemError>;

    async fn admin_exists(&self) -> Result<bool, error::SystemError>;
}

use crate::{
    api::error, modules::auth::model::NewSession, modules::auth::schema::SessionUserRow,
};

#[async_trait::async_trait]
pub trait SessionRepository {
    async fn insert(&self, session: &NewSession) -> Result<(), error::SystemError>;

    async fn find_with_user(
        &self,
        token: &str,
    ) -> Result<Option<SessionUserRow>, error::SystemError>;

    /// Returns whether a row was removed.
    async fn delete(&self, token: &str) -> Result<bool, error::SystemError>;

    /// Revoke every session of a user, optionally sparing one token.
    /// Returns the number of revoked sessions.
    async fn delete_for_user(
        &self,
        user_id: i64,
        keep_token: Option<&str>,
    ) -> Result<u64, error::SystemError>;

    async fn touch(&self, token: &str) -> Result<(), error::SystemError>;
}

use crate::{api::error, modules::setting::schema::SettingEntity};

#[async_trait::async_trait]
pub trait SettingRepository {
    async fn get(&self, key: &str) -> Result<Option<String>, error::SystemError>;

    async fn all(&self) -> Result<Vec<SettingEntity>, error::SystemError>;

    async fn upsert(&self, key: &str, value: &str) -> Result<(), error::SystemError>;
}

use crate::{
    api::error,
    modules::file::model::NewFile,
    modules::file::schema::{FileEntity, FileVisibility},
};

#[async_trait::async_trait]
pub trait FileRepository {
    async fn insert(&self, file: &NewFile) -> Result<FileEntity, error::SystemError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<FileEntity>, error::SystemError>;

    /// Files the given user may see in the default listing: their own plus
    /// every public one.
    async fn list_visible_to(&self, user_id: i64) -> Result<Vec<FileEntity>, error::SystemError>;

    async fn list_owned(&self, owner_id: i64) -> Result<Vec<FileEntity>, error::SystemError>;

    async fn list_all(&self) -> Result<Vec<FileEntity>, error::SystemError>;

    async fn update_visibility(
        &self,
        id: i64,
        visibility: FileVisibility,
    ) -> Result<Option<FileEntity>, error::SystemError>;

    /// Remove the row and hand back what was removed, so the caller can
    /// unlink the stored bytes exactly once.
    async fn delete(&self, id: i64) -> Result<Option<FileEntity>, error::SystemError>;

    async fn total_size_for_owner(&self, owner_id: i64) -> Result<i64, error::SystemError>;
}

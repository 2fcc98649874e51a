use crate::{
    api::error,
    modules::file::{
        model::NewFile,
        repository::FileRepository,
        schema::{FileEntity, FileVisibility},
    },
};

#[derive(Clone)]
pub struct FileRepositoryPg {
    pool: sqlx::PgPool,
}

impl FileRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl FileRepository for FileRepositoryPg {
    async fn insert(&self, file: &NewFile) -> Result<FileEntity, error::SystemError> {
        let entity = sqlx::query_as::<_, FileEntity>(
            r#"
            INSERT INTO files (name, mime_type, size_bytes, owner_id, visibility, storage_name)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&file.name)
        .bind(&file.mime_type)
        .bind(file.size_bytes)
        .bind(file.owner_id)
        .bind(file.visibility)
        .bind(&file.storage_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(entity)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<FileEntity>, error::SystemError> {
        let file = sqlx::query_as::<_, FileEntity>("SELECT * FROM files WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(file)
    }

    async fn list_visible_to(&self, user_id: i64) -> Result<Vec<FileEntity>, error::SystemError> {
        let files = sqlx::query_as::<_, FileEntity>(
            r#"
            SELECT * FROM files
            WHERE owner_id = $1 OR visibility = 'public'
            ORDER BY uploaded_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(files)
    }

    async fn list_owned(&self, owner_id: i64) -> Result<Vec<FileEntity>, error::SystemError> {
        let files = sqlx::query_as::<_, FileEntity>(
            "SELECT * FROM files WHERE owner_id = $1 ORDER BY uploaded_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(files)
    }

    async fn list_all(&self) -> Result<Vec<FileEntity>, error::SystemError> {
        let files =
            sqlx::query_as::<_, FileEntity>("SELECT * FROM files ORDER BY uploaded_at DESC")
                .fetch_all(&self.pool)
                .await?;
        Ok(files)
    }

    async fn update_visibility(
        &self,
        id: i64,
        visibility: FileVisibility,
    ) -> Result<Option<FileEntity>, error::SystemError> {
        let file = sqlx::query_as::<_, FileEntity>(
            "UPDATE files SET visibility = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(visibility)
        .fetch_optional(&self.pool)
        .await?;
        Ok(file)
    }

    async fn delete(&self, id: i64) -> Result<Option<FileEntity>, error::SystemError> {
        let file =
            sqlx::query_as::<_, FileEntity>("DELETE FROM files WHERE id = $1 RETURNING *")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(file)
    }

    async fn total_size_for_owner(&self, owner_id: i64) -> Result<i64, error::SystemError> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(size_bytes), 0)::BIGINT FROM files WHERE owner_id = $1",
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }
}

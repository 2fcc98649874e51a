use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::modules::file::schema::{FileEntity, FileVisibility};

/// Metadata for a freshly uploaded file.
#[derive(Debug, Clone)]
pub struct NewFile {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub owner_id: i64,
    pub visibility: FileVisibility,
    pub storage_name: String,
}

/// Which slice of the catalog a listing returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListScope {
    /// Own files plus everything public.
    Shared,
    /// Own files only.
    Mine,
    /// Every file in the system. Admin only.
    All,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ListQueryModel {
    pub scope: Option<ListScope>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServeMode {
    Download,
    Preview,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ContentQueryModel {
    pub mode: Option<ServeMode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVisibilityModel {
    pub visibility: FileVisibility,
}

/// Catalog entry as exposed to clients. The on-disk storage name stays
/// server-side.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileModel {
    pub id: i64,
    pub name: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub owner_id: Option<i64>,
    pub visibility: FileVisibility,
    pub uploaded_at: DateTime<Utc>,
}

impl From<FileEntity> for FileModel {
    fn from(entity: FileEntity) -> Self {
        FileModel {
            id: entity.id,
            name: entity.name,
            mime_type: entity.mime_type,
            size_bytes: entity.size_bytes,
            owner_id: entity.owner_id,
            visibility: entity.visibility,
            uploaded_at: entity.uploaded_at,
        }
    }
}

/// Bytes plus the response headers the byte-serving endpoint derives.
#[derive(Debug)]
pub struct FileContent {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub disposition: String,
    pub cache_control: &'static str,
}

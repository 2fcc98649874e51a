use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};

#[derive(Debug, PartialEq, Eq, Clone, Copy, Type, Serialize, Deserialize)]
#[sqlx(type_name = "file_visibility", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FileVisibility {
    Private,
    Public,
}

impl FileVisibility {
    pub fn as_str(self) -> &'static str {
        match self {
            FileVisibility::Private => "private",
            FileVisibility::Public => "public",
        }
    }

    /// Strict lowercase token, the same spelling `as_str` emits.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "private" => Some(FileVisibility::Private),
            "public" => Some(FileVisibility::Public),
            _ => None,
        }
    }
}

/// File metadata row. `storage_name` is the collision-resistant on-disk name
/// relative to the upload root and is never exposed to clients; `name` is the
/// display name given at upload.
#[derive(Debug, Clone, FromRow)]
pub struct FileEntity {
    pub id: i64,
    pub name: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub owner_id: Option<i64>,
    pub visibility: FileVisibility,
    pub storage_name: String,
    pub uploaded_at: chrono::DateTime<chrono::Utc>,
}

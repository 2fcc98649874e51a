use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use uuid::Uuid;

use crate::api::error;
use crate::modules::audit::{model::NewLogEntry, schema::LogCategory, service::AuditService};
use crate::modules::file::{
    model::{FileContent, FileModel, ListScope, NewFile, ServeMode},
    repository::FileRepository,
    schema::{FileEntity, FileVisibility},
};
use crate::modules::policy::{self, Action, Actor, PolicyContext, Resource};
use crate::modules::setting::service::SettingService;
use crate::utils::ClientMeta;

#[derive(Clone)]
pub struct FileService {
    repo: Arc<dyn FileRepository + Send + Sync>,
    settings: SettingService,
    audit: AuditService,
    upload_root: PathBuf,
}

impl FileService {
    pub fn with_dependencies(
        repo: Arc<dyn FileRepository + Send + Sync>,
        settings: SettingService,
        audit: AuditService,
        upload_root: PathBuf,
    ) -> Self {
        FileService { repo, settings, audit, upload_root }
    }

    /// Admission order: policy, size cap, type whitelist, owner quota. Bytes
    /// reach the disk only after every check has passed, so a rejected upload
    /// leaves nothing behind.
    pub async fn upload(
        &self,
        ctx: PolicyContext,
        actor: &Actor,
        meta: &ClientMeta,
        original_name: String,
        declared_mime: Option<String>,
        visibility: FileVisibility,
        bytes: Vec<u8>,
    ) -> Result<FileModel, error::SystemError> {
        if let Err(reason) =
            policy::authorize(ctx, Some(actor), &Resource::System, Action::Upload).require()
        {
            self.audit.denied(Some(actor), meta, "file_upload", None, reason).await;
            return Err(reason.into_error());
        }

        let name = original_name.trim().to_string();
        if name.is_empty() {
            return Err(error::SystemError::validation("File name is required"));
        }

        let size = bytes.len() as u64;
        let limit = self.settings.file_size_limit_bytes().await?;
        if size > limit {
            return Err(error::SystemError::too_large(format!(
                "File exceeds the {} MB limit",
                limit / (1024 * 1024)
            )));
        }

        if let Some(allowed) = self.settings.allowed_extensions().await? {
            match extension_of(&name) {
                Some(ext) if allowed.contains(&ext) => {}
                _ => {
                    return Err(error::SystemError::type_not_allowed(format!(
                        "File type is not allowed, accepted: {}",
                        allowed.join(", ")
                    )));
                }
            }
        }

        if let Some(quota) = self.settings.storage_quota_bytes().await? {
            let used = self.repo.total_size_for_owner(actor.id).await? as u64;
            if used + size > quota {
                return Err(error::SystemError::too_large(format!(
                    "Storage quota of {} MB exceeded",
                    quota / (1024 * 1024)
                )));
            }
        }

        let storage_name = format!("{}_{}", Uuid::now_v7(), sanitize_file_name(&name));
        let mime_type = declared_mime
            .filter(|m| m.contains('/'))
            .unwrap_or_else(|| mime_guess::from_path(&name).first_or_octet_stream().to_string());

        tokio::fs::write(self.upload_root.join(&storage_name), &bytes).await?;

        let new_file = NewFile {
            name,
            mime_type,
            size_bytes: size as i64,
            owner_id: actor.id,
            visibility,
            storage_name,
        };
        let entity = match self.repo.insert(&new_file).await {
            Ok(entity) => entity,
            Err(e) => {
                // The row never landed, take the bytes back out.
                if let Err(unlink_err) =
                    tokio::fs::remove_file(self.upload_root.join(&new_file.storage_name)).await
                {
                    log::warn!(
                        "Orphaned object '{}' could not be removed: {}",
                        new_file.storage_name, unlink_err
                    );
                }
                return Err(e);
            }
        };

        self.audit
            .append(
                NewLogEntry::new(LogCategory::File, "file_upload", &meta.ip)
                    .user(actor.id)
                    .resource(entity.id)
                    .details(format!("'{}' ({} bytes)", entity.name, entity.size_bytes)),
            )
            .await;

        Ok(FileModel::from(entity))
    }

    pub async fn list(
        &self,
        ctx: PolicyContext,
        actor: &Actor,
        meta: &ClientMeta,
        scope: ListScope,
    ) -> Result<Vec<FileModel>, error::SystemError> {
        let (action, label) = match scope {
            ListScope::All => (Action::ListAllFiles, "file_list_all"),
            _ => (Action::ListFiles, "file_list"),
        };
        if let Err(reason) =
            policy::authorize(ctx, Some(actor), &Resource::System, action).require()
        {
            self.audit.denied(Some(actor), meta, label, None, reason).await;
            return Err(reason.into_error());
        }

        let files = match scope {
            ListScope::Shared => self.repo.list_visible_to(actor.id).await?,
            ListScope::Mine => self.repo.list_owned(actor.id).await?,
            ListScope::All => self.repo.list_all().await?,
        };
        Ok(files.into_iter().map(FileModel::from).collect())
    }

    /// Setting the visibility a file already has is a no-op that still
    /// reports success; only real transitions reach the ledger.
    pub async fn update_visibility(
        &self,
        ctx: PolicyContext,
        actor: &Actor,
        meta: &ClientMeta,
        file_id: i64,
        visibility: FileVisibility,
    ) -> Result<FileModel, error::SystemError> {
        let file = self.require_file(file_id).await?;

        if let Err(reason) = policy::authorize(
            ctx,
            Some(actor),
            &Resource::File((&file).into()),
            Action::ToggleVisibility,
        )
        .require()
        {
            self.audit.denied(Some(actor), meta, "file_visibility", Some(file_id), reason).await;
            return Err(reason.into_error());
        }

        if file.visibility == visibility {
            return Ok(FileModel::from(file));
        }

        let updated = self
            .repo
            .update_visibility(file_id, visibility)
            .await?
            .ok_or_else(|| error::SystemError::not_found("File not found"))?;

        self.audit
            .append(
                NewLogEntry::new(LogCategory::File, "file_visibility", &meta.ip)
                    .user(actor.id)
                    .resource(updated.id)
                    .details(format!("'{}' set to {}", updated.name, visibility.as_str())),
            )
            .await;

        Ok(FileModel::from(updated))
    }

    /// Metadata row first, bytes second. A file that loses its bytes but
    /// keeps its row is reported on the next read; a row that is gone makes
    /// the bytes unreachable garbage at worst.
    pub async fn delete(
        &self,
        ctx: PolicyContext,
        actor: &Actor,
        meta: &ClientMeta,
        file_id: i64,
    ) -> Result<(), error::SystemError> {
        let file = self.require_file(file_id).await?;

        if let Err(reason) =
            policy::authorize(ctx, Some(actor), &Resource::File((&file).into()), Action::Delete)
                .require()
        {
            self.audit.denied(Some(actor), meta, "file_delete", Some(file_id), reason).await;
            return Err(reason.into_error());
        }

        let Some(removed) = self.repo.delete(file_id).await? else {
            return Err(error::SystemError::not_found("File not found"));
        };

        if let Some(path) = storage_path_under(&self.upload_root, &removed.storage_name) {
            // A missing backing file is a warning too, the row said it existed.
            if let Err(e) = tokio::fs::remove_file(&path).await {
                log::warn!("Stored object '{}' could not be removed: {}", removed.storage_name, e);
            }
        }

        self.audit
            .append(
                NewLogEntry::new(LogCategory::File, "file_delete", &meta.ip)
                    .user(actor.id)
                    .resource(removed.id)
                    .details(format!("'{}'", removed.name)),
            )
            .await;

        Ok(())
    }

    /// Hand out the stored bytes with the headers the catalog entry dictates.
    pub async fn serve(
        &self,
        ctx: PolicyContext,
        actor: &Actor,
        meta: &ClientMeta,
        file_id: i64,
        mode: ServeMode,
    ) -> Result<FileContent, error::SystemError> {
        let file = self.require_file(file_id).await?;

        let Some(path) = storage_path_under(&self.upload_root, &file.storage_name) else {
            self.audit
                .append(
                    NewLogEntry::new(LogCategory::Security, "file_access", &meta.ip)
                        .user(actor.id)
                        .resource(file.id)
                        .details(format!(
                            "denied: storage name '{}' escapes the upload root",
                            file.storage_name
                        )),
                )
                .await;
            return Err(error::SystemError::permission_denied("File access denied"));
        };

        if let Err(reason) =
            policy::authorize(ctx, Some(actor), &Resource::File((&file).into()), Action::Read)
                .require()
        {
            self.audit.denied(Some(actor), meta, "file_access", Some(file_id), reason).await;
            return Err(reason.into_error());
        }

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::warn!("File {} has a catalog row but no bytes at '{}'", file.id, file.storage_name);
                return Err(error::SystemError::data_missing("File content is no longer available"));
            }
            Err(e) => return Err(e.into()),
        };

        let content_type = effective_content_type(&file);
        let disposition = disposition_for(mode, &content_type, &file.name);
        let cache_control = match file.visibility {
            FileVisibility::Public => "public, max-age=3600",
            FileVisibility::Private => "private, no-store",
        };

        let action = match mode {
            ServeMode::Download => "download",
            ServeMode::Preview => "preview",
        };
        self.audit
            .append(
                NewLogEntry::new(LogCategory::File, action, &meta.ip)
                    .user(actor.id)
                    .resource(file.id)
                    .details(format!("'{}'", file.name)),
            )
            .await;

        Ok(FileContent { bytes, content_type, disposition, cache_control })
    }

    async fn require_file(&self, file_id: i64) -> Result<FileEntity, error::SystemError> {
        self.repo
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("File not found"))
    }
}

/// Strip any path components and anything outside [A-Za-z0-9._-]. The result
/// is only ever used behind a UUID prefix, so collisions do not matter.
pub fn sanitize_file_name(name: &str) -> String {
    let base = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("file");
    let mut cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    cleaned.truncate(100);
    if cleaned.chars().all(|c| c == '.' || c == '_') {
        "file".to_string()
    } else {
        cleaned
    }
}

pub fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// A storage name must stay a single path component under the root. Anything
/// else in the column is treated as hostile, wherever it came from.
pub fn storage_path_under(root: &Path, storage_name: &str) -> Option<PathBuf> {
    let mut components = Path::new(storage_name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => {}
        _ => return None,
    }
    let path = root.join(storage_name);
    path.starts_with(root).then_some(path)
}

fn is_inline_type(mime: &str) -> bool {
    mime.starts_with("image/") || mime.starts_with("text/") || mime == "application/pdf"
}

fn effective_content_type(file: &FileEntity) -> String {
    if file.mime_type.contains('/') {
        file.mime_type.clone()
    } else {
        mime_guess::from_path(&file.name).first_or_octet_stream().to_string()
    }
}

/// Inline rendering is offered only for previews of types a browser can show
/// harmlessly; everything else downloads as an attachment.
fn disposition_for(mode: ServeMode, content_type: &str, name: &str) -> String {
    let safe_name: String = name.chars().filter(|c| *c != '"' && !c.is_control()).collect();
    if mode == ServeMode::Preview && is_inline_type(content_type) {
        format!("inline; filename=\"{safe_name}\"")
    } else {
        format!("attachment; filename=\"{safe_name}\"")
    }
}

use actix_multipart::{Field, Multipart};
use actix_web::{
    delete, get, http::header, patch, post, web, HttpRequest, HttpResponse,
};
use futures_util::TryStreamExt;

use crate::{
    api::{error, success},
    middlewares::get_current_user,
    utils::{self, ValidatedQuery},
};

use crate::modules::file::{
    model::{self, ListScope, ServeMode},
    schema::FileVisibility,
    service::FileService,
};
use crate::modules::setting::service::SettingService;

#[post("")]
pub async fn upload_file(
    file_service: web::Data<FileService>,
    setting_service: web::Data<SettingService>,
    mut payload: Multipart,
    req: HttpRequest,
) -> Result<success::Success<model::FileModel>, error::Error> {
    let current = get_current_user(&req)?;
    let meta = utils::client_meta(&req);
    let ctx = setting_service.policy_context().await?;
    let limit = setting_service.file_size_limit_bytes().await?;

    let mut visibility = FileVisibility::Private;
    let mut upload: Option<(String, Option<String>, Vec<u8>)> = None;

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|_| error::Error::bad_request("Malformed multipart payload"))?
    {
        let (filename, field_name) = {
            let cd = field.content_disposition();
            (
                cd.and_then(|cd| cd.get_filename()).map(str::to_string),
                cd.and_then(|cd| cd.get_name()).map(str::to_string),
            )
        };

        if let Some(filename) = filename {
            if upload.is_some() {
                continue;
            }
            let mime_type = field.content_type().map(|m| m.to_string());

            // Stop reading as soon as the stream exceeds the limit rather than
            // buffering an arbitrarily large body first.
            let mut bytes: Vec<u8> = Vec::new();
            while let Some(chunk) = field
                .try_next()
                .await
                .map_err(|_| error::Error::bad_request("Malformed multipart payload"))?
            {
                if (bytes.len() + chunk.len()) as u64 > limit {
                    return Err(error::SystemError::too_large(format!(
                        "File exceeds the {} MB limit",
                        limit / (1024 * 1024)
                    ))
                    .into());
                }
                bytes.extend_from_slice(&chunk);
            }
            upload = Some((filename, mime_type, bytes));
        } else if field_name.as_deref() == Some("visibility") {
            visibility = read_visibility_field(&mut field).await?;
        }
    }

    let Some((filename, mime_type, bytes)) = upload else {
        return Err(error::Error::bad_request("No file found in request"));
    };

    let file = file_service
        .upload(ctx, &current.actor(), &meta, filename, mime_type, visibility, bytes)
        .await?;
    Ok(success::Success::created(Some(file)).message("File uploaded successfully"))
}

/// Text field next to the file part. Absent means private.
async fn read_visibility_field(field: &mut Field) -> Result<FileVisibility, error::Error> {
    let mut raw: Vec<u8> = Vec::new();
    while let Some(chunk) = field
        .try_next()
        .await
        .map_err(|_| error::Error::bad_request("Malformed multipart payload"))?
    {
        if raw.len() + chunk.len() > 64 {
            return Err(
                error::SystemError::validation("Visibility must be 'private' or 'public'").into()
            );
        }
        raw.extend_from_slice(&chunk);
    }
    std::str::from_utf8(&raw)
        .ok()
        .and_then(|value| FileVisibility::parse(value.trim()))
        .ok_or_else(|| {
            error::SystemError::validation("Visibility must be 'private' or 'public'").into()
        })
}

#[get("")]
pub async fn list_files(
    file_service: web::Data<FileService>,
    setting_service: web::Data<SettingService>,
    query: ValidatedQuery<model::ListQueryModel>,
    req: HttpRequest,
) -> Result<success::Success<Vec<model::FileModel>>, error::Error> {
    let current = get_current_user(&req)?;
    let meta = utils::client_meta(&req);
    let ctx = setting_service.policy_context().await?;
    let scope = query.0.scope.unwrap_or(ListScope::Shared);

    let files = file_service.list(ctx, &current.actor(), &meta, scope).await?;
    Ok(success::Success::ok(Some(files)))
}

#[patch("/{id:\\d+}/visibility")]
pub async fn update_visibility(
    file_service: web::Data<FileService>,
    setting_service: web::Data<SettingService>,
    file_id: web::Path<i64>,
    body: web::Json<model::UpdateVisibilityModel>,
    req: HttpRequest,
) -> Result<success::Success<model::FileModel>, error::Error> {
    let current = get_current_user(&req)?;
    let meta = utils::client_meta(&req);
    let ctx = setting_service.policy_context().await?;

    let file = file_service
        .update_visibility(ctx, &current.actor(), &meta, file_id.into_inner(), body.visibility)
        .await?;
    Ok(success::Success::ok(Some(file)).message("Visibility updated"))
}

#[delete("/{id:\\d+}")]
pub async fn delete_file(
    file_service: web::Data<FileService>,
    setting_service: web::Data<SettingService>,
    file_id: web::Path<i64>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let current = get_current_user(&req)?;
    let meta = utils::client_meta(&req);
    let ctx = setting_service.policy_context().await?;

    file_service.delete(ctx, &current.actor(), &meta, file_id.into_inner()).await?;
    Ok(success::Success::no_content())
}

#[get("/{id:\\d+}/content")]
pub async fn file_content(
    file_service: web::Data<FileService>,
    setting_service: web::Data<SettingService>,
    file_id: web::Path<i64>,
    query: ValidatedQuery<model::ContentQueryModel>,
    req: HttpRequest,
) -> Result<HttpResponse, error::Error> {
    let current = get_current_user(&req)?;
    let meta = utils::client_meta(&req);
    let ctx = setting_service.policy_context().await?;
    let mode = query.0.mode.unwrap_or(ServeMode::Download);

    let content = file_service
        .serve(ctx, &current.actor(), &meta, file_id.into_inner(), mode)
        .await?;

    Ok(HttpResponse::Ok()
        .content_type(content.content_type)
        .insert_header((header::CONTENT_DISPOSITION, content.disposition))
        .insert_header((header::CACHE_CONTROL, content.cache_control))
        .body(content.bytes))
}

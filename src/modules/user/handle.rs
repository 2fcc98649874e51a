use actix_web::{delete, get, patch, post, web, HttpRequest};

use crate::{
    api::{error, success},
    middlewares::get_current_user,
    utils::{self, ValidatedJson},
};

use crate::modules::setting::service::SettingService;
use crate::modules::user::{model, service::UserService};

#[post("")]
pub async fn create_user(
    user_service: web::Data<UserService>,
    setting_service: web::Data<SettingService>,
    body: ValidatedJson<model::CreateUserModel>,
    req: HttpRequest,
) -> Result<success::Success<model::UserModel>, error::Error> {
    let current = get_current_user(&req)?;
    let meta = utils::client_meta(&req);
    let ctx = setting_service.policy_context().await?;

    let user = user_service.create_user(ctx, &current.actor(), &meta, body.0).await?;
    Ok(success::Success::created(Some(user)).message("User created"))
}

#[get("")]
pub async fn list_users(
    user_service: web::Data<UserService>,
    setting_service: web::Data<SettingService>,
    req: HttpRequest,
) -> Result<success::Success<Vec<model::UserModel>>, error::Error> {
    let current = get_current_user(&req)?;
    let meta = utils::client_meta(&req);
    let ctx = setting_service.policy_context().await?;

    let users = user_service.list_users(ctx, &current.actor(), &meta).await?;
    Ok(success::Success::ok(Some(users)))
}

#[patch("/{id:\\d+}/role")]
pub async fn update_role(
    user_service: web::Data<UserService>,
    setting_service: web::Data<SettingService>,
    user_id: web::Path<i64>,
    body: web::Json<model::UpdateRoleModel>,
    req: HttpRequest,
) -> Result<success::Success<model::UserModel>, error::Error> {
    let current = get_current_user(&req)?;
    let meta = utils::client_meta(&req);
    let ctx = setting_service.policy_context().await?;

    let user = user_service
        .update_role(ctx, &current.actor(), &meta, user_id.into_inner(), body.role)
        .await?;
    Ok(success::Success::ok(Some(user)).message("Role updated"))
}

#[patch("/{id:\\d+}/status")]
pub async fn update_status(
    user_service: web::Data<UserService>,
    setting_service: web::Data<SettingService>,
    user_id: web::Path<i64>,
    body: web::Json<model::UpdateStatusModel>,
    req: HttpRequest,
) -> Result<success::Success<model::UserModel>, error::Error> {
    let current = get_current_user(&req)?;
    let meta = utils::client_meta(&req);
    let ctx = setting_service.policy_context().await?;

    let user = user_service
        .update_status(ctx, &current.actor(), &meta, user_id.into_inner(), body.status)
        .await?;
    Ok(success::Success::ok(Some(user)).message("Status updated"))
}

#[post("/{id:\\d+}/password")]
pub async fn reset_password(
    user_service: web::Data<UserService>,
    setting_service: web::Data<SettingService>,
    user_id: web::Path<i64>,
    body: ValidatedJson<model::ResetPasswordModel>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let current = get_current_user(&req)?;
    let meta = utils::client_meta(&req);
    let ctx = setting_service.policy_context().await?;

    user_service
        .reset_password(ctx, &current.actor(), &meta, user_id.into_inner(), &body.0.new_password)
        .await?;
    Ok(success::Success::ok(None).message("Password reset"))
}

#[delete("/{id:\\d+}")]
pub async fn delete_user(
    user_service: web::Data<UserService>,
    setting_service: web::Data<SettingService>,
    user_id: web::Path<i64>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let current = get_current_user(&req)?;
    let meta = utils::client_meta(&req);
    let ctx = setting_service.policy_context().await?;

    user_service.delete_user(ctx, &current.actor(), &meta, user_id.into_inner()).await?;
    Ok(success::Success::no_content())
}

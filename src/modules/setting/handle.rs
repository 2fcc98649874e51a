use std::collections::HashMap;

use actix_web::{get, put, web, HttpRequest};

use crate::{
    api::{error, success},
    middlewares::get_current_user,
    utils,
};

use crate::modules::setting::{model::EffectiveSettings, service::SettingService};

#[get("")]
pub async fn get_settings(
    setting_service: web::Data<SettingService>,
    req: HttpRequest,
) -> Result<success::Success<EffectiveSettings>, error::Error> {
    let current = get_current_user(&req)?;
    let meta = utils::client_meta(&req);
    let ctx = setting_service.policy_context().await?;

    let effective = setting_service.effective_for(ctx, &current.actor(), &meta).await?;
    Ok(success::Success::ok(Some(effective)))
}

#[put("")]
pub async fn update_settings(
    setting_service: web::Data<SettingService>,
    body: web::Json<HashMap<String, String>>,
    req: HttpRequest,
) -> Result<success::Success<EffectiveSettings>, error::Error> {
    let current = get_current_user(&req)?;
    let meta = utils::client_meta(&req);
    let ctx = setting_service.policy_context().await?;

    let effective = setting_service
        .update_for(ctx, &current.actor(), &meta, body.into_inner())
        .await?;
    Ok(success::Success::ok(Some(effective)).message("Settings updated"))
}

use actix_web::{get, web, HttpRequest};

use crate::{
    api::{error, success},
    middlewares::get_current_user,
    utils::{self, ValidatedQuery},
};

use crate::modules::audit::{
    model::{LogPage, LogQueryModel},
    service::AuditService,
};
use crate::modules::setting::service::SettingService;

#[get("")]
pub async fn query_logs(
    audit_service: web::Data<AuditService>,
    setting_service: web::Data<SettingService>,
    query: ValidatedQuery<LogQueryModel>,
    req: HttpRequest,
) -> Result<success::Success<LogPage>, error::Error> {
    let current = get_current_user(&req)?;
    let meta = utils::client_meta(&req);
    let ctx = setting_service.policy_context().await?;

    let page = audit_service.query_for(ctx, &current.actor(), &meta, query.0).await?;
    Ok(success::Success::ok(Some(page)))
}

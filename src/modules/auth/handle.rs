use actix_web::{
    cookie::{time, Cookie, SameSite},
    get, post, web, HttpRequest,
};

use crate::{
    api::{error, success},
    constants::SESSION_COOKIE,
    middlewares::{get_current_user, get_session_token},
    utils::{self, ValidatedJson},
};

use crate::modules::auth::{model, service::AuthService};
use crate::modules::setting::service::SettingService;

fn session_cookie(token: String, max_age_seconds: i64) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(max_age_seconds))
        .finish()
}

fn removal_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, "")
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(0))
        .expires(time::OffsetDateTime::UNIX_EPOCH)
        .finish()
}

#[post("/auth/login")]
pub async fn login(
    auth_service: web::Data<AuthService>,
    setting_service: web::Data<SettingService>,
    body: ValidatedJson<model::LoginModel>,
    req: HttpRequest,
) -> Result<success::Success<model::SessionUserModel>, error::Error> {
    let meta = utils::client_meta(&req);
    let ctx = setting_service.policy_context().await?;
    let timeout = setting_service.session_timeout().await?;

    let (user, token) = auth_service.login(ctx, body.0, &meta).await?;
    let cookie = session_cookie(token, timeout.num_seconds());

    Ok(success::Success::ok(Some(user))
        .message("Signin successful")
        .cookies(vec![cookie]))
}

#[post("/auth/logout")]
pub async fn logout(
    auth_service: web::Data<AuthService>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let current = get_current_user(&req)?;
    let token = get_session_token(&req)?;
    let meta = utils::client_meta(&req);

    auth_service.logout(current.id, &token, &meta).await?;
    Ok(success::Success::no_content().cookies(vec![removal_cookie()]))
}

#[get("/auth/me")]
pub async fn me(
    auth_service: web::Data<AuthService>,
    req: HttpRequest,
) -> Result<success::Success<model::SessionUserModel>, error::Error> {
    let current = get_current_user(&req)?;
    let user = auth_service.me(current.id).await?;
    Ok(success::Success::ok(Some(user)))
}

#[post("/auth/password")]
pub async fn change_password(
    auth_service: web::Data<AuthService>,
    body: ValidatedJson<model::ChangePasswordModel>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let current = get_current_user(&req)?;
    let token = get_session_token(&req)?;
    let meta = utils::client_meta(&req);

    auth_service.change_password(current.id, body.0, &token, &meta).await?;
    Ok(success::Success::ok(None).message("Password changed"))
}

use actix_web::{
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
    web, Error, HttpMessage, HttpRequest,
};

use crate::{
    api::error, constants::SESSION_COOKIE, modules::auth::service::AuthService,
    modules::policy::Actor, modules::user::schema::UserRole,
};

/// Identity of the session owner, parked in request extensions by
/// `authentication`.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    pub role: UserRole,
}

impl CurrentUser {
    pub fn actor(&self) -> Actor {
        Actor { id: self.id, role: self.role }
    }
}

/// The bearer token of the current request. Logout and password change need
/// it to target or spare the session that carried them.
#[derive(Debug, Clone)]
pub struct SessionToken(pub String);

fn extract_token(req: &ServiceRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.to_string())
}

pub async fn authentication<B>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<B>, Error>
where
    B: MessageBody + 'static,
{
    let Some(token) = extract_token(&req) else {
        return Err(error::Error::unauthorized("Authentication required").into());
    };

    let Some(auth_service) = req.app_data::<web::Data<AuthService>>() else {
        log::error!("AuthService is not registered in app data");
        return Err(error::Error::InternalServer.into());
    };

    let user = auth_service.resolve_session(&token).await.map_err(error::Error::from)?;
    let Some(user) = user else {
        return Err(error::Error::unauthorized("Session invalid or expired").into());
    };

    req.extensions_mut().insert(CurrentUser {
        id: user.id,
        username: user.username,
        role: user.role,
    });
    req.extensions_mut().insert(SessionToken(token));

    next.call(req).await
}

pub fn get_current_user(req: &HttpRequest) -> Result<CurrentUser, error::Error> {
    let extensions = req.extensions();

    let current = extensions
        .get::<CurrentUser>()
        .ok_or_else(|| error::Error::unauthorized("Unauthorized"))?
        .clone();

    Ok(current)
}

pub fn get_session_token(req: &HttpRequest) -> Result<String, error::Error> {
    let extensions = req.extensions();

    let token = extensions
        .get::<SessionToken>()
        .ok_or_else(|| error::Error::unauthorized("Unauthorized"))?
        .0
        .clone();

    Ok(token)
}

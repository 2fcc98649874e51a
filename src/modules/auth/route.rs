use crate::modules::auth::handle::*;
use actix_web::web::ServiceConfig;

pub fn public_api_configure(cfg: &mut ServiceConfig) {
    cfg.service(login);
}

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(logout).service(me).service(change_password);
}

use crate::modules::setting::handle::*;
use actix_web::web::{scope, ServiceConfig};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(scope("/admin/settings").service(get_settings).service(update_settings));
}

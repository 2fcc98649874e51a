use crate::modules::user::handle::*;
use actix_web::web::{scope, ServiceConfig};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/admin/users")
            .service(create_user)
            .service(list_users)
            .service(update_role)
            .service(update_status)
            .service(reset_password)
            .service(delete_user),
    );
}

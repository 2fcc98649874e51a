use crate::modules::file::handle::*;
use actix_web::web::{scope, ServiceConfig};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/files")
            .service(upload_file)
            .service(list_files)
            .service(update_visibility)
            .service(delete_file)
            .service(file_content),
    );
}

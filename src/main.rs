use actix_cors::Cors;
use actix_web::{
    self, http, App, HttpServer,
    middleware::{from_fn, Logger},
    web,
};
use std::sync::{Arc, LazyLock};

use crate::{
    configs::{connect_database, run_migrations},
    middlewares::authentication,
    modules::{
        audit::{repository_pg::AuditRepositoryPg, service::AuditService},
        auth::{repository_pg::SessionRepositoryPg, service::AuthService},
        file::{repository_pg::FileRepositoryPg, service::FileService},
        setting::{repository_pg::SettingRepositoryPg, service::SettingService},
        user::{repository_pg::UserRepositoryPg, service::UserService},
    },
};

mod api;
mod configs;
mod constants;
mod middlewares;
mod modules;
#[cfg(test)]
mod test;
mod utils;

pub static ENV: LazyLock<constants::Env> = LazyLock::new(|| {
    dotenvy::dotenv().ok();
    env_logger::init();
    log::info!("Environment variables loaded from .env file");
    constants::Env::default()
});

#[actix_web::get("/")]
async fn health_check() -> &'static str {
    "Server is running"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let db_pool =
        connect_database().await.map_err(|_| std::io::Error::other("Database connection error"))?;
    run_migrations(&db_pool).await.map_err(|_| std::io::Error::other("Migration error"))?;

    tokio::fs::create_dir_all(&ENV.upload_dir).await?;
    let upload_root = tokio::fs::canonicalize(&ENV.upload_dir).await?;

    let audit_repo = Arc::new(AuditRepositoryPg::new(db_pool.clone()));
    let session_repo = Arc::new(SessionRepositoryPg::new(db_pool.clone()));
    let setting_repo = Arc::new(SettingRepositoryPg::new(db_pool.clone()));
    let user_repo = Arc::new(UserRepositoryPg::new(db_pool.clone()));
    let file_repo = Arc::new(FileRepositoryPg::new(db_pool.clone()));

    let audit_service = AuditService::with_dependencies(audit_repo);
    let setting_service =
        SettingService::with_dependencies(setting_repo, audit_service.clone());
    let auth_service = AuthService::with_dependencies(
        session_repo.clone(),
        user_repo.clone(),
        setting_service.clone(),
        audit_service.clone(),
    );
    let file_service = FileService::with_dependencies(
        file_repo,
        setting_service.clone(),
        audit_service.clone(),
        upload_root,
    );
    let user_service = UserService::with_dependencies(
        user_repo,
        session_repo,
        setting_service.clone(),
        audit_service.clone(),
    );

    user_service.seed_admin().await.map_err(|_| std::io::Error::other("Seed admin error"))?;

    println!("Starting server at http://{}:{}", ENV.ip.as_str(), ENV.port);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(ENV.frontend_url.as_str())
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE"])
            .allowed_headers(vec![http::header::AUTHORIZATION, http::header::CONTENT_TYPE])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(web::Data::new(audit_service.clone()))
            .app_data(web::Data::new(setting_service.clone()))
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(file_service.clone()))
            .app_data(web::Data::new(user_service.clone()))
            .app_data(web::Data::new(db_pool.clone()))
            .service(health_check)
            .service(
                web::scope("/api").configure(modules::auth::route::public_api_configure).service(
                    web::scope("")
                        .wrap(from_fn(authentication))
                        .configure(modules::auth::route::configure)
                        .configure(modules::file::route::configure)
                        .configure(modules::user::route::configure)
                        .configure(modules::audit::route::configure)
                        .configure(modules::setting::route::configure),
                ),
            )
    })
    .bind((ENV.ip.as_str(), ENV.port))?
    .workers(2)
    .run()
    .await
}

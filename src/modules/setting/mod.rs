pub mod handle;
pub mod model;
pub mod repository;
pub mod repository_pg;
pub mod route;
pub mod schema;
pub mod service;

pub use repository::SettingRepository;
pub use repository_pg::SettingRepositoryPg;
pub use schema::SettingEntity;
pub use service::SettingService;

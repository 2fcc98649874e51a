pub mod handle;
pub mod model;
pub mod repository;
pub mod repository_pg;
pub mod route;
pub mod schema;
pub mod service;

pub use model::NewLogEntry;
pub use repository::AuditRepository;
pub use repository_pg::AuditRepositoryPg;
pub use schema::LogCategory;
pub use service::AuditService;

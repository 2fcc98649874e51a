pub mod handle;
pub mod model;
pub mod repository;
pub mod repository_pg;
pub mod route;
pub mod schema;
pub mod service;

pub use repository::SessionRepository;
pub use repository_pg::SessionRepositoryPg;
pub use service::AuthService;

pub mod handle;
pub mod model;
pub mod repository;
pub mod repository_pg;
pub mod route;
pub mod schema;
pub mod service;

pub use repository::UserRepository;
pub use repository_pg::UserRepositoryPg;
pub use schema::{UserEntity, UserRole, UserStatus};
pub use service::UserService;

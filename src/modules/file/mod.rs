pub mod handle;
pub mod model;
pub mod repository;
pub mod repository_pg;
pub mod route;
pub mod schema;
pub mod service;

pub use repository::FileRepository;
pub use repository_pg::FileRepositoryPg;
pub use schema::{FileEntity, FileVisibility};
pub use service::FileService;

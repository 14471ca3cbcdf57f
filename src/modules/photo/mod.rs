pub mod handle;
pub mod model;
pub mod processor;
pub mod repository;
pub mod repository_pg;
pub mod route;
pub mod schema;
pub mod service;

pub use repository_pg::PhotoRepositoryPg;
pub use service::PhotoService;

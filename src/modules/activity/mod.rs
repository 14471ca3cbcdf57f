pub mod model;
pub mod repository;
pub mod repository_pg;
pub mod schema;

pub use model::NewActivityLog;
pub use repository::ActivityLogRepository;
pub use repository_pg::ActivityLogRepositoryPg;
pub use schema::ActivityLogEntity;

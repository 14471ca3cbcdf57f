pub mod handle;
pub mod model;
pub mod repository;
pub mod repository_pg;
pub mod route;
pub mod schema;
pub mod service;

pub use model::UploadConfig;
pub use repository::PublicFileRepository;
pub use repository_pg::PublicFileRepositoryPg;
pub use schema::PublicAssetEntity;
pub use service::PublicFileService;

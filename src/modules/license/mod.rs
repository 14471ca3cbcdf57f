pub mod handle;
pub mod model;
pub mod repository;
pub mod repository_pg;
pub mod route;
pub mod service;

pub use model::{LicenseConfig, LicenseInfo};
pub use repository_pg::SettingsRepositoryPg;
pub use service::LicenseService;

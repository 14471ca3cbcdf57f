pub mod handle;
pub mod model;
pub mod provider;
pub mod repository;
pub mod repository_pg;
pub mod route;
pub mod service;

pub use provider::{GmailAdminClient, MailProvider};
pub use repository::DirectoryRepository;
pub use repository_pg::DirectoryRepositoryPg;
pub use service::EmailSecurityService;

use actix_cors::Cors;
use actix_web::{
    self,
    middleware::{from_fn, Logger},
    web, App, HttpServer,
};
use std::sync::{Arc, LazyLock};

use crate::{
    api::success,
    configs::{connect_database, run_migrations},
    middlewares::authentication,
    modules::{
        activity::ActivityLogRepositoryPg,
        email_security::{DirectoryRepositoryPg, EmailSecurityService, GmailAdminClient, MailProvider},
        license::{LicenseConfig, LicenseService, SettingsRepositoryPg},
        photo::{PhotoRepositoryPg, PhotoService},
        public_file::{PublicFileRepositoryPg, PublicFileService},
        workflow::{WorkflowRepositoryPg, WorkflowService},
    },
    storage::LocalStorage,
};

mod api;
mod configs;
mod constants;
mod middlewares;
mod modules;
mod storage;
#[cfg(test)]
mod test;
mod utils;

pub static ENV: LazyLock<constants::Env> = LazyLock::new(|| {
    dotenvy::dotenv().ok();
    constants::Env::default()
});

#[actix_web::get("/")]
async fn health_check() -> &'static str {
    "Server is running"
}

#[derive(serde::Serialize)]
struct HealthStatus {
    status: &'static str,
    version: &'static str,
}

#[actix_web::get("/health")]
async fn api_health() -> success::Success<HealthStatus> {
    success::Success::ok(Some(HealthStatus { status: "ok", version: constants::APP_VERSION }))
}

/// Route tree shared by the server and the route tests.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    utils::configure_extractors(cfg);
    cfg.service(health_check).service(
        web::scope("/api/v1").service(api_health).service(
            web::scope("")
                .wrap(from_fn(authentication))
                .configure(modules::photo::route::configure)
                .configure(modules::workflow::route::configure)
                .configure(modules::public_file::route::configure)
                .configure(modules::email_security::route::configure)
                .configure(modules::license::route::configure),
        ),
    );
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    log::info!("Starting helios-api {}", constants::APP_VERSION);

    let db_pool = connect_database().await.map_err(|e| {
        log::error!("Database connection error: {:?}", e);
        std::io::Error::other("Database connection error")
    })?;

    if ENV.run_migrations {
        run_migrations(&db_pool).await.map_err(|e| {
            log::error!("Migration error: {:?}", e);
            std::io::Error::other("Migration error")
        })?;
    }

    let storage = Arc::new(LocalStorage::new(&ENV.upload_dir, &ENV.public_asset_url));
    let activity_repo = Arc::new(ActivityLogRepositoryPg::new(db_pool.clone()));

    let photo_service = PhotoService::with_dependencies(
        Arc::new(PhotoRepositoryPg::new(db_pool.clone())),
        storage.clone(),
    );
    let public_file_service = PublicFileService::with_defaults(
        Arc::new(PublicFileRepositoryPg::new(db_pool.clone())),
        storage.clone(),
    );
    let workflow_service =
        WorkflowService::with_dependencies(Arc::new(WorkflowRepositoryPg::new(db_pool.clone())));

    let mail_provider =
        GmailAdminClient::new(&ENV.mail_provider_url, ENV.mail_provider_token.clone())
            .map_err(|e| std::io::Error::other(e.to_string()))?;
    if !mail_provider.is_configured() {
        log::warn!("MAIL_PROVIDER_TOKEN is not set; email security endpoints will reject requests");
    }
    let email_security_service = EmailSecurityService::with_dependencies(
        Arc::new(DirectoryRepositoryPg::new(db_pool.clone())),
        activity_repo,
        Arc::new(mail_provider),
    );

    let license_service = Arc::new(
        LicenseService::new(
            LicenseConfig {
                license_key: ENV.license_key.clone(),
                url: ENV.license_url.clone(),
                instance_id: ENV.instance_id.clone(),
                version: constants::APP_VERSION.to_string(),
            },
            Arc::new(SettingsRepositoryPg::new(db_pool.clone())),
        )
        .map_err(|e| std::io::Error::other(e.to_string()))?,
    );
    license_service.initialize().await;
    let license_refresh = license_service.clone().spawn_refresh();
    let license_data = web::Data::from(license_service);

    log::info!("Starting server at http://{}:{}", ENV.ip.as_str(), ENV.port);
    let result = HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&ENV.frontend_url)
            .allow_any_method()
            .allow_any_header()
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(web::Data::new(photo_service.clone()))
            .app_data(web::Data::new(public_file_service.clone()))
            .app_data(web::Data::new(workflow_service.clone()))
            .app_data(web::Data::new(email_security_service.clone()))
            .app_data(license_data.clone())
            .configure(configure_routes)
    })
    .bind((ENV.ip.as_str(), ENV.port))?
    .workers(2)
    .run()
    .await;

    license_refresh.abort();
    result
}

pub struct Env {
    pub jwt_secret: String,
    pub database_url: String,
    pub public_asset_url: String,
    pub upload_dir: String,
    pub license_key: Option<String>,
    pub license_url: String,
    pub instance_id: String,
    pub mail_provider_url: String,
    pub mail_provider_token: Option<String>,
    pub frontend_url: String,
    pub ip: String,
    pub port: u16,
    pub run_migrations: bool,
}

pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

fn optional_var(name: &str) -> Option<String> {
    std::env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl Env {
    fn new() -> Self {
        let jwt_secret = std::env::var("SECRET_KEY")
            .expect("SECRET_KEY must be set in .env file or environment variable");

        let database_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set in .env file or environment variable");

        let public_asset_url = std::env::var("PUBLIC_ASSET_URL")
            .unwrap_or_else(|_| "http://localhost:8080/assets".to_string());
        let upload_dir = std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string());

        let license_key = optional_var("HELIOS_LICENSE_KEY");
        let license_url = std::env::var("HELIOS_LICENSE_URL")
            .unwrap_or_else(|_| "https://license.helios.gridworx.io/api/v1/validate".to_string());
        let instance_id =
            optional_var("HELIOS_INSTANCE_ID").unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let mail_provider_url = std::env::var("MAIL_PROVIDER_URL")
            .unwrap_or_else(|_| "https://gmail.googleapis.com".to_string());
        let mail_provider_token = optional_var("MAIL_PROVIDER_TOKEN");

        let frontend_url =
            std::env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:5173".to_string());
        let ip = std::env::var("IP").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .expect("PORT must be a valid u16 integer");
        let run_migrations = std::env::var("RUN_MIGRATIONS")
            .unwrap_or_else(|_| "false".to_string())
            .parse::<bool>()
            .expect("RUN_MIGRATIONS must be true or false");

        Env {
            jwt_secret,
            database_url,
            public_asset_url,
            upload_dir,
            license_key,
            license_url,
            instance_id,
            mail_provider_url,
            mail_provider_token,
            frontend_url,
            ip,
            port,
            run_migrations,
        }
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}

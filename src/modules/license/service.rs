use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::{sync::RwLock, task::JoinHandle};

use crate::{
    api::error,
    modules::license::{
        model::{LicenseConfig, LicenseFeatures, LicenseInfo, ValidationRequest, ValidationResponse},
        repository::SettingsRepository,
    },
};

pub const LICENSE_CACHE_KEY: &str = "license_cache";
const VALIDATION_TIMEOUT: Duration = Duration::from_secs(10);
const REFRESH_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

struct CachedLicense {
    info: LicenseInfo,
    /// Time of the last validation attempt, successful or not.
    checked_at: DateTime<Utc>,
}

impl CachedLicense {
    fn is_fresh(&self) -> bool {
        Utc::now().signed_duration_since(self.checked_at) < chrono::Duration::hours(24)
    }
}

/// Process-wide license state. Validates against the license server, keeps the
/// result for 24 hours and degrades to the last known result or the community
/// edition when the server cannot be reached.
pub struct LicenseService {
    client: reqwest::Client,
    config: LicenseConfig,
    settings: Arc<dyn SettingsRepository + Send + Sync>,
    cache: RwLock<Option<CachedLicense>>,
}

impl LicenseService {
    pub fn new(
        config: LicenseConfig,
        settings: Arc<dyn SettingsRepository + Send + Sync>,
    ) -> Result<Self, error::SystemError> {
        let client = reqwest::Client::builder().timeout(VALIDATION_TIMEOUT).build()?;
        Ok(LicenseService { client, config, settings, cache: RwLock::new(None) })
    }

    pub async fn initialize(&self) -> LicenseInfo {
        let info = self.validate().await;
        tracing::info!(tier = %info.tier, valid = info.valid, "License initialized");
        info
    }

    /// Revalidate now. Never fails: errors degrade to a fallback license.
    pub async fn validate(&self) -> LicenseInfo {
        let Some(key) = self.config.license_key.as_deref() else {
            let info = LicenseInfo::community();
            self.store(info.clone()).await;
            return info;
        };

        match self.request_validation(key).await {
            Ok(info) => {
                self.persist(&info).await;
                self.store(info.clone()).await;
                info
            }
            Err(e) => {
                tracing::warn!(error = %e, "License validation failed, using fallback");
                let info = self.fallback().await;
                self.store(info.clone()).await;
                info
            }
        }
    }

    pub async fn get_license(&self) -> LicenseInfo {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref().filter(|c| c.is_fresh()) {
                return cached.info.clone();
            }
        }
        self.validate().await
    }

    pub async fn get_features(&self) -> LicenseFeatures {
        self.get_license().await.features
    }

    pub async fn has_feature(&self, name: &str) -> bool {
        self.get_features().await.get(name).copied().unwrap_or(false)
    }

    /// Revalidate every 24 hours. The first run happens one interval after the call.
    pub fn spawn_refresh(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(REFRESH_INTERVAL);
            interval.tick().await;
            loop {
                interval.tick().await;
                let info = self.validate().await;
                tracing::info!(tier = %info.tier, valid = info.valid, "License refreshed");
            }
        })
    }

    async fn request_validation(&self, key: &str) -> Result<LicenseInfo, error::SystemError> {
        let body = ValidationRequest {
            license_key: key,
            instance_id: &self.config.instance_id,
            version: &self.config.version,
        };

        let response = self
            .client
            .post(&self.config.url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json::<ValidationResponse>()
            .await?;

        Ok(response.into_info(Utc::now()))
    }

    async fn fallback(&self) -> LicenseInfo {
        if let Some(cached) = self.cache.read().await.as_ref() {
            return cached.info.clone();
        }

        match self.settings.get(LICENSE_CACHE_KEY).await {
            Ok(Some(value)) => match serde_json::from_value::<LicenseInfo>(value) {
                Ok(info) => return info,
                Err(e) => tracing::warn!(error = %e, "Persisted license is unreadable"),
            },
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "Failed to load persisted license"),
        }

        LicenseInfo::community()
    }

    async fn persist(&self, info: &LicenseInfo) {
        let result = match serde_json::to_value(info) {
            Ok(value) => self.settings.set(LICENSE_CACHE_KEY, &value).await,
            Err(e) => Err(e.into()),
        };
        if let Err(e) = result {
            tracing::error!(error = %e, "Failed to persist license cache");
        }
    }

    async fn store(&self, info: LicenseInfo) {
        *self.cache.write().await = Some(CachedLicense { info, checked_at: Utc::now() });
    }
}

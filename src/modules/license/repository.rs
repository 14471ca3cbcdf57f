use crate::api::error;

/// Key/value rows of `system_settings`.
#[async_trait::async_trait]
pub trait SettingsRepository {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, error::SystemError>;

    async fn set(&self, key: &str, value: &serde_json::Value) -> Result<(), error::SystemError>;
}

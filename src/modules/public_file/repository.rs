use uuid::Uuid;

use crate::{
    api::error,
    modules::public_file::{
        model::{NewPublicAsset, PublicAssetFilter},
        schema::PublicAssetEntity,
    },
};

#[async_trait::async_trait]
pub trait PublicFileRepository {
    async fn key_exists(
        &self,
        organization_id: &Uuid,
        asset_key: &str,
    ) -> Result<bool, error::SystemError>;

    async fn create(&self, asset: &NewPublicAsset)
        -> Result<PublicAssetEntity, error::SystemError>;

    async fn find_by_id(
        &self,
        organization_id: &Uuid,
        asset_id: &Uuid,
    ) -> Result<Option<PublicAssetEntity>, error::SystemError>;

    async fn list(
        &self,
        organization_id: &Uuid,
        filter: &PublicAssetFilter,
    ) -> Result<Vec<PublicAssetEntity>, error::SystemError>;

    /// Bumps `usage_count` and `last_accessed_at`.
    async fn record_usage(
        &self,
        organization_id: &Uuid,
        asset_id: &Uuid,
    ) -> Result<Option<PublicAssetEntity>, error::SystemError>;

    async fn set_tags(
        &self,
        organization_id: &Uuid,
        asset_id: &Uuid,
        tags: &[String],
    ) -> Result<Option<PublicAssetEntity>, error::SystemError>;

    async fn deactivate(
        &self,
        organization_id: &Uuid,
        asset_id: &Uuid,
    ) -> Result<bool, error::SystemError>;

    async fn delete(&self, organization_id: &Uuid, asset_id: &Uuid)
        -> Result<bool, error::SystemError>;
}

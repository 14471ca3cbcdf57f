use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        photo::{
            model::{NewPhotoAsset, NewPhotoSize, PhotoEntity, PhotoKind, PhotoUrls, StoredOriginal},
            schema::{PhotoSizeEntity, PhotoUrlsRow},
        },
        public_file::schema::PublicAssetEntity,
    },
};

#[async_trait::async_trait]
pub trait PhotoRepository {
    /// Placeholder row; storage fields are filled in by `attach_original`.
    async fn insert_asset(
        &self,
        asset: &NewPhotoAsset,
    ) -> Result<PublicAssetEntity, error::SystemError>;

    async fn attach_original(
        &self,
        asset_id: &Uuid,
        original: &StoredOriginal,
    ) -> Result<(), error::SystemError>;

    async fn insert_size(&self, size: &NewPhotoSize)
        -> Result<PhotoSizeEntity, error::SystemError>;

    /// Whether the user (avatar) or organization (logo) exists in the organization.
    async fn owner_exists(
        &self,
        kind: PhotoKind,
        organization_id: &Uuid,
        owner_id: &Uuid,
    ) -> Result<bool, error::SystemError>;

    /// Point the owning user or organization at the asset. Returns false when
    /// the owner row does not exist.
    async fn link_owner(
        &self,
        kind: PhotoKind,
        organization_id: &Uuid,
        owner_id: &Uuid,
        asset_id: &Uuid,
        urls: &PhotoUrls,
    ) -> Result<bool, error::SystemError>;

    async fn find_asset(
        &self,
        organization_id: &Uuid,
        asset_id: &Uuid,
    ) -> Result<Option<PublicAssetEntity>, error::SystemError>;

    async fn find_sizes(&self, asset_id: &Uuid)
        -> Result<Vec<PhotoSizeEntity>, error::SystemError>;

    /// Clear owner URL columns that still reference the asset.
    async fn unlink_owners(&self, asset_id: &Uuid) -> Result<(), error::SystemError>;

    /// Deletes the asset row; size rows go with it.
    async fn delete_asset(&self, asset_id: &Uuid) -> Result<bool, error::SystemError>;

    async fn find_photo_urls(
        &self,
        entity: PhotoEntity,
        organization_id: &Uuid,
        entity_id: &Uuid,
    ) -> Result<Option<PhotoUrlsRow>, error::SystemError>;
}

use std::sync::Arc;

use image::DynamicImage;
use uuid::Uuid;

use crate::{
    api::error,
    modules::photo::{
        model::{
            NewPhotoAsset, NewPhotoSize, PhotoEntity, PhotoKind, PhotoUpload, PhotoUploadRequest,
            PhotoUrls, StoredOriginal, DERIVATIVE_QUALITY, ORIGINAL_QUALITY, PHOTO_SIZES,
        },
        processor,
        repository::PhotoRepository,
    },
    storage::LocalStorage,
};

#[derive(Clone)]
pub struct PhotoService {
    repo: Arc<dyn PhotoRepository + Send + Sync>,
    storage: Arc<LocalStorage>,
}

impl PhotoService {
    pub fn with_dependencies(
        repo: Arc<dyn PhotoRepository + Send + Sync>,
        storage: Arc<LocalStorage>,
    ) -> Self {
        log::info!("PhotoService initialized with dependencies");
        PhotoService { repo, storage }
    }

    /// Store an avatar or logo as a WebP original plus the four square renditions,
    /// then point the owner at them.
    ///
    /// Steps run strictly in order:
    /// 1. Decode (rejects anything that is not an image, before any write)
    /// 2. Check the owner exists (404 before any write)
    /// 3. Insert the asset row
    /// 4. Write the re-encoded original
    /// 5. Render, write and record each size, smallest first
    /// 6. Update the owning user or organization
    ///
    /// A failure after step 3 is returned as-is; files and rows already written
    /// are left in place.
    pub async fn upload_photo(
        &self,
        request: PhotoUploadRequest,
    ) -> Result<PhotoUpload, error::SystemError> {
        let PhotoUploadRequest { bytes, kind, organization_id, user_id, aspect_ratio, uploaded_by } =
            request;

        let image = tokio::task::spawn_blocking(move || processor::decode(&bytes))
            .await?
            .map_err(|_| error::SystemError::bad_request("Invalid image file"))?;
        let image = Arc::new(image);

        let owner_id = match kind {
            PhotoKind::Avatar => user_id.unwrap_or(uploaded_by),
            PhotoKind::Logo => organization_id,
        };
        if !self.repo.owner_exists(kind, &organization_id, &owner_id).await? {
            return Err(owner_not_found(kind));
        }

        let id = Uuid::now_v7();
        let asset = NewPhotoAsset {
            id,
            organization_id,
            user_id: (kind == PhotoKind::Avatar).then_some(owner_id),
            asset_key: format!("{}-{}", kind.as_str(), id),
            asset_type: kind.as_str(),
            width: image.width() as i32,
            height: image.height() as i32,
            aspect_ratio,
        };
        let asset_id = self.repo.insert_asset(&asset).await?.id;

        let result = self.store_renditions(kind, organization_id, owner_id, asset_id, image).await;
        if let Err(e) = &result {
            tracing::warn!(
                asset_id = %asset_id,
                error = %e,
                "Photo upload aborted, partially stored asset left in place"
            );
        }
        result
    }

    async fn store_renditions(
        &self,
        kind: PhotoKind,
        organization_id: Uuid,
        owner_id: Uuid,
        asset_id: Uuid,
        image: Arc<DynamicImage>,
    ) -> Result<PhotoUpload, error::SystemError> {
        let prefix = format!("{}/{}s/{}", organization_id, kind.as_str(), asset_id);

        let img = image.clone();
        let original =
            tokio::task::spawn_blocking(move || processor::encode_webp(&img, ORIGINAL_QUALITY))
                .await?;
        let original_key = format!("{prefix}/original.webp");
        let stored = StoredOriginal {
            storage_path: self.storage.write(&original_key, &original).await?,
            public_url: self.storage.public_url(&original_key),
            size_bytes: original.len() as i64,
        };
        self.repo.attach_original(&asset_id, &stored).await?;

        let mut urls = PhotoUrls::new();
        for size in PHOTO_SIZES {
            let img = image.clone();
            let rendition = tokio::task::spawn_blocking(move || {
                processor::render_square(&img, size, DERIVATIVE_QUALITY)
            })
            .await?;

            let key = format!("{prefix}/{size}.webp");
            let new_size = NewPhotoSize {
                asset_id,
                size,
                storage_path: self.storage.write(&key, &rendition).await?,
                public_url: self.storage.public_url(&key),
                file_size: rendition.len() as i64,
            };
            self.repo.insert_size(&new_size).await?;
            urls.insert(size, new_size.public_url);
        }

        let linked =
            self.repo.link_owner(kind, &organization_id, &owner_id, &asset_id, &urls).await?;
        if !linked {
            return Err(owner_not_found(kind));
        }

        tracing::info!(asset_id = %asset_id, kind = kind.as_str(), "Photo stored");
        Ok(PhotoUpload { asset_id, original_url: stored.public_url, urls })
    }

    /// Remove an asset's files and row. Unlink failures are logged and skipped;
    /// the call succeeds once the row is gone.
    ///
    /// `restrict_to` limits deletion to avatars owned by that user; admins pass `None`.
    pub async fn delete_photo(
        &self,
        organization_id: Uuid,
        asset_id: Uuid,
        restrict_to: Option<Uuid>,
    ) -> Result<(), error::SystemError> {
        let asset = self
            .repo
            .find_asset(&organization_id, &asset_id)
            .await?
            .filter(|a| a.asset_type != "file")
            .ok_or_else(|| error::SystemError::not_found("Photo not found"))?;

        if let Some(user_id) = restrict_to {
            if asset.user_id != Some(user_id) {
                return Err(error::SystemError::forbidden(
                    "You don't have permission to delete this photo",
                ));
            }
        }
        let sizes = self.repo.find_sizes(&asset_id).await?;

        let paths = std::iter::once(asset.storage_path)
            .chain(sizes.into_iter().map(|s| s.storage_path))
            .filter(|p| !p.is_empty());
        for path in paths {
            if let Err(e) = self.storage.remove(&path).await {
                log::warn!("Failed to remove photo file {}: {}", path, e);
            }
        }

        self.repo.unlink_owners(&asset_id).await?;
        if !self.repo.delete_asset(&asset_id).await? {
            return Err(error::SystemError::not_found("Photo not found"));
        }
        Ok(())
    }

    /// URLs of the user's avatar or organization's logo, looked up inside `organization_id`.
    pub async fn get_photo_urls(
        &self,
        entity: PhotoEntity,
        organization_id: Uuid,
        entity_id: Uuid,
    ) -> Result<Option<PhotoUrls>, error::SystemError> {
        let row = self.repo.find_photo_urls(entity, &organization_id, &entity_id).await?;
        Ok(row.and_then(|r| r.into_urls()))
    }
}

fn owner_not_found(kind: PhotoKind) -> error::SystemError {
    error::SystemError::not_found(match kind {
        PhotoKind::Avatar => "User not found",
        PhotoKind::Logo => "Organization not found",
    })
}

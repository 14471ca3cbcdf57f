use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        photo::processor,
        public_file::{
            model::{merge_tags, NewPublicAsset, PublicAssetFilter, PublicFileUpload, UploadConfig},
            repository::PublicFileRepository,
            schema::PublicAssetEntity,
        },
    },
    storage::LocalStorage,
    utils::slugify,
};

#[derive(Clone)]
pub struct PublicFileService {
    repo: Arc<dyn PublicFileRepository + Send + Sync>,
    storage: Arc<LocalStorage>,
    config: UploadConfig,
}

impl PublicFileService {
    pub fn new(
        repo: Arc<dyn PublicFileRepository + Send + Sync>,
        storage: Arc<LocalStorage>,
        config: UploadConfig,
    ) -> Self {
        Self { repo, storage, config }
    }

    pub fn with_defaults(
        repo: Arc<dyn PublicFileRepository + Send + Sync>,
        storage: Arc<LocalStorage>,
    ) -> Self {
        Self::new(repo, storage, UploadConfig::default())
    }

    /// Declared content type, falling back to a guess from the filename when the
    /// client sent nothing useful.
    fn resolve_mime(filename: &str, declared: Option<&str>) -> String {
        match declared {
            Some(m) if !m.is_empty() && m != "application/octet-stream" => m.to_string(),
            _ => mime_guess::from_path(filename).first_or_octet_stream().essence_str().to_string(),
        }
    }

    /// Validate file type and size
    fn validate_file(&self, file_size: usize, mime_type: &str) -> Result<(), error::SystemError> {
        if file_size == 0 {
            return Err(error::SystemError::bad_request("File is empty"));
        }

        if file_size > self.config.max_file_size {
            return Err(error::SystemError::bad_request(format!(
                "File size exceeds maximum allowed size of {} bytes",
                self.config.max_file_size
            )));
        }

        if !self.config.allowed_mime_types.iter().any(|m| m == mime_type) {
            return Err(error::SystemError::bad_request(format!(
                "File type '{}' is not allowed",
                mime_type
            )));
        }

        Ok(())
    }

    fn default_asset_key(filename: &str) -> String {
        let stem = Path::new(filename).file_stem().and_then(|s| s.to_str()).unwrap_or("");
        let slug = slugify(stem);
        let slug = if slug.is_empty() { "file".to_string() } else { slug };
        let suffix = Uuid::new_v4().simple().to_string();
        format!("{}-{}", slug, &suffix[..8])
    }

    fn storage_key(organization_id: &Uuid, asset_id: &Uuid, filename: &str, mime: &str) -> String {
        let extension = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .or_else(|| {
                mime_guess::get_mime_extensions_str(mime)
                    .and_then(|exts| exts.first())
                    .map(|ext| ext.to_string())
            });

        match extension {
            Some(ext) => format!("{}/files/{}.{}", organization_id, asset_id, ext),
            None => format!("{}/files/{}", organization_id, asset_id),
        }
    }

    async fn discard(&self, path: &str) {
        if let Err(e) = self.storage.remove(path).await {
            log::warn!("Failed to remove uploaded file {}: {}", path, e);
        }
    }

    /// Store a file and record it. An explicit `asset_key` that is already taken
    /// in the organization fails with 400 and the written file is removed.
    pub async fn upload(
        &self,
        organization_id: Uuid,
        uploaded_by: Uuid,
        upload: PublicFileUpload,
    ) -> Result<PublicAssetEntity, error::SystemError> {
        let PublicFileUpload { filename, bytes, content_type, asset_key, tags } = upload;

        let mime_type = Self::resolve_mime(&filename, content_type.as_deref());
        self.validate_file(bytes.len(), &mime_type)?;

        let explicit_key = asset_key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty());
        if let Some(key) = &explicit_key {
            if key.len() > 200 || key.contains('/') {
                return Err(error::SystemError::bad_request("Invalid asset key"));
            }
        }

        let dimensions =
            if mime_type.starts_with("image/") { processor::dimensions(&bytes) } else { None };

        let asset_id = Uuid::now_v7();
        let key = Self::storage_key(&organization_id, &asset_id, &filename, &mime_type);
        let storage_path = self.storage.write(&key, &bytes).await?;

        let asset_key = match explicit_key {
            Some(key) => {
                let taken = match self.repo.key_exists(&organization_id, &key).await {
                    Ok(taken) => taken,
                    Err(e) => {
                        self.discard(&storage_path).await;
                        return Err(e);
                    }
                };
                if taken {
                    self.discard(&storage_path).await;
                    return Err(error::SystemError::bad_request(format!(
                        "Asset key '{}' already exists",
                        key
                    )));
                }
                key
            }
            None => Self::default_asset_key(&filename),
        };

        let new_asset = NewPublicAsset {
            id: asset_id,
            organization_id,
            user_id: Some(uploaded_by),
            asset_key,
            original_filename: Some(filename),
            mime_type,
            size_bytes: bytes.len() as i64,
            width: dimensions.map(|(w, _)| w as i32),
            height: dimensions.map(|(_, h)| h as i32),
            storage_path: storage_path.clone(),
            public_url: self.storage.public_url(&key),
            tags,
        };

        match self.repo.create(&new_asset).await {
            Ok(asset) => Ok(asset),
            Err(e) => {
                self.discard(&storage_path).await;
                match e {
                    error::SystemError::Conflict(_) => Err(error::SystemError::bad_request(format!(
                        "Asset key '{}' already exists",
                        new_asset.asset_key
                    ))),
                    other => Err(other),
                }
            }
        }
    }

    pub async fn list(
        &self,
        organization_id: Uuid,
        filter: PublicAssetFilter,
    ) -> Result<Vec<PublicAssetEntity>, error::SystemError> {
        self.repo.list(&organization_id, &filter).await
    }

    pub async fn get(
        &self,
        organization_id: Uuid,
        asset_id: Uuid,
    ) -> Result<PublicAssetEntity, error::SystemError> {
        self.repo
            .find_by_id(&organization_id, &asset_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Asset not found"))
    }

    pub async fn record_usage(
        &self,
        organization_id: Uuid,
        asset_id: Uuid,
    ) -> Result<PublicAssetEntity, error::SystemError> {
        self.repo
            .record_usage(&organization_id, &asset_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Asset not found"))
    }

    /// Union the given tags into the asset's existing tags.
    pub async fn add_tags(
        &self,
        organization_id: Uuid,
        asset_id: Uuid,
        tags: Vec<String>,
    ) -> Result<PublicAssetEntity, error::SystemError> {
        let asset = self.get(organization_id, asset_id).await?;
        let merged = merge_tags(&asset.tags, &tags);

        self.repo
            .set_tags(&organization_id, &asset_id, &merged)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Asset not found"))
    }

    /// Soft delete flips `is_active`; hard delete unlinks the file and removes the row.
    pub async fn delete(
        &self,
        organization_id: Uuid,
        asset_id: Uuid,
        hard: bool,
    ) -> Result<(), error::SystemError> {
        if !hard {
            if !self.repo.deactivate(&organization_id, &asset_id).await? {
                return Err(error::SystemError::not_found("Asset not found"));
            }
            return Ok(());
        }

        let asset = self.get(organization_id, asset_id).await?;
        if asset.asset_type != "file" {
            return Err(error::SystemError::bad_request(
                "Avatars and logos are removed through the photos endpoint",
            ));
        }
        self.discard(&asset.storage_path).await;
        self.repo.delete(&organization_id, &asset_id).await?;
        Ok(())
    }
}

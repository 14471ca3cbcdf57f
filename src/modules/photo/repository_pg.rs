use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        photo::{
            model::{NewPhotoAsset, NewPhotoSize, PhotoEntity, PhotoKind, PhotoUrls, StoredOriginal},
            repository::PhotoRepository,
            schema::{PhotoSizeEntity, PhotoUrlsRow},
        },
        public_file::schema::PublicAssetEntity,
    },
};

#[derive(Clone)]
pub struct PhotoRepositoryPg {
    pool: sqlx::PgPool,
}

impl PhotoRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl PhotoRepository for PhotoRepositoryPg {
    async fn insert_asset(
        &self,
        asset: &NewPhotoAsset,
    ) -> Result<PublicAssetEntity, error::SystemError> {
        let entity = sqlx::query_as::<_, PublicAssetEntity>(
            r#"
            INSERT INTO public_assets
                (id, organization_id, user_id, asset_key, asset_type, mime_type,
                 width, height, aspect_ratio, storage_path, public_url)
            VALUES ($1, $2, $3, $4, $5, 'image/webp', $6, $7, $8, '', '')
            RETURNING *
            "#,
        )
        .bind(asset.id)
        .bind(asset.organization_id)
        .bind(asset.user_id)
        .bind(&asset.asset_key)
        .bind(asset.asset_type)
        .bind(asset.width)
        .bind(asset.height)
        .bind(asset.aspect_ratio)
        .fetch_one(&self.pool)
        .await?;

        Ok(entity)
    }

    async fn attach_original(
        &self,
        asset_id: &Uuid,
        original: &StoredOriginal,
    ) -> Result<(), error::SystemError> {
        sqlx::query(
            r#"
            UPDATE public_assets
            SET storage_path = $2, public_url = $3, size_bytes = $4, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(asset_id)
        .bind(&original.storage_path)
        .bind(&original.public_url)
        .bind(original.size_bytes)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn insert_size(
        &self,
        size: &NewPhotoSize,
    ) -> Result<PhotoSizeEntity, error::SystemError> {
        let entity = sqlx::query_as::<_, PhotoSizeEntity>(
            r#"
            INSERT INTO photo_sizes
                (id, asset_id, size_key, width, height, storage_path, public_url, file_size)
            VALUES ($1, $2, $3, $4, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(size.asset_id)
        .bind(size.size.to_string())
        .bind(size.size as i32)
        .bind(&size.storage_path)
        .bind(&size.public_url)
        .bind(size.file_size)
        .fetch_one(&self.pool)
        .await?;

        Ok(entity)
    }

    async fn owner_exists(
        &self,
        kind: PhotoKind,
        organization_id: &Uuid,
        owner_id: &Uuid,
    ) -> Result<bool, error::SystemError> {
        let sql = match kind {
            PhotoKind::Avatar => {
                "SELECT EXISTS(SELECT 1 FROM organization_users WHERE id = $1 AND organization_id = $2)"
            }
            PhotoKind::Logo => "SELECT EXISTS(SELECT 1 FROM organizations WHERE id = $1 AND id = $2)",
        };

        let exists = sqlx::query_scalar::<_, bool>(sql)
            .bind(owner_id)
            .bind(organization_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn link_owner(
        &self,
        kind: PhotoKind,
        organization_id: &Uuid,
        owner_id: &Uuid,
        asset_id: &Uuid,
        urls: &PhotoUrls,
    ) -> Result<bool, error::SystemError> {
        let sql = match kind {
            PhotoKind::Avatar => {
                r#"
                UPDATE organization_users
                SET avatar_asset_id = $3,
                    avatar_url_50 = $4, avatar_url_100 = $5, avatar_url_200 = $6, avatar_url_400 = $7,
                    updated_at = NOW()
                WHERE id = $1 AND organization_id = $2
                "#
            }
            PhotoKind::Logo => {
                r#"
                UPDATE organizations
                SET logo_asset_id = $3,
                    logo_url_50 = $4, logo_url_100 = $5, logo_url_200 = $6, logo_url_400 = $7,
                    updated_at = NOW()
                WHERE id = $1 AND id = $2
                "#
            }
        };

        let rows = sqlx::query(sql)
            .bind(owner_id)
            .bind(organization_id)
            .bind(asset_id)
            .bind(urls.get(&50))
            .bind(urls.get(&100))
            .bind(urls.get(&200))
            .bind(urls.get(&400))
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows > 0)
    }

    async fn find_asset(
        &self,
        organization_id: &Uuid,
        asset_id: &Uuid,
    ) -> Result<Option<PublicAssetEntity>, error::SystemError> {
        let asset = sqlx::query_as::<_, PublicAssetEntity>(
            "SELECT * FROM public_assets WHERE id = $1 AND organization_id = $2",
        )
        .bind(asset_id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(asset)
    }

    async fn find_sizes(
        &self,
        asset_id: &Uuid,
    ) -> Result<Vec<PhotoSizeEntity>, error::SystemError> {
        let sizes = sqlx::query_as::<_, PhotoSizeEntity>(
            "SELECT * FROM photo_sizes WHERE asset_id = $1 ORDER BY width",
        )
        .bind(asset_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sizes)
    }

    async fn unlink_owners(&self, asset_id: &Uuid) -> Result<(), error::SystemError> {
        sqlx::query(
            r#"
            UPDATE organization_users
            SET avatar_asset_id = NULL, avatar_url_50 = NULL, avatar_url_100 = NULL,
                avatar_url_200 = NULL, avatar_url_400 = NULL, updated_at = NOW()
            WHERE avatar_asset_id = $1
            "#,
        )
        .bind(asset_id)
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            UPDATE organizations
            SET logo_asset_id = NULL, logo_url_50 = NULL, logo_url_100 = NULL,
                logo_url_200 = NULL, logo_url_400 = NULL, updated_at = NOW()
            WHERE logo_asset_id = $1
            "#,
        )
        .bind(asset_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_asset(&self, asset_id: &Uuid) -> Result<bool, error::SystemError> {
        let rows = sqlx::query("DELETE FROM public_assets WHERE id = $1")
            .bind(asset_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows > 0)
    }

    async fn find_photo_urls(
        &self,
        entity: PhotoEntity,
        organization_id: &Uuid,
        entity_id: &Uuid,
    ) -> Result<Option<PhotoUrlsRow>, error::SystemError> {
        let sql = match entity {
            PhotoEntity::User => {
                r#"
                SELECT avatar_url_50 AS url_50, avatar_url_100 AS url_100,
                       avatar_url_200 AS url_200, avatar_url_400 AS url_400
                FROM organization_users WHERE id = $1 AND organization_id = $2
                "#
            }
            PhotoEntity::Organization => {
                r#"
                SELECT logo_url_50 AS url_50, logo_url_100 AS url_100,
                       logo_url_200 AS url_200, logo_url_400 AS url_400
                FROM organizations WHERE id = $1 AND id = $2
                "#
            }
        };

        let row = sqlx::query_as::<_, PhotoUrlsRow>(sql)
            .bind(entity_id)
            .bind(organization_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }
}

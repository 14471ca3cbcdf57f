use uuid::Uuid;

use crate::{
    api::error,
    modules::public_file::{
        model::{NewPublicAsset, PublicAssetFilter},
        repository::PublicFileRepository,
        schema::PublicAssetEntity,
    },
};

#[derive(Clone)]
pub struct PublicFileRepositoryPg {
    pool: sqlx::PgPool,
}

impl PublicFileRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl PublicFileRepository for PublicFileRepositoryPg {
    async fn key_exists(
        &self,
        organization_id: &Uuid,
        asset_key: &str,
    ) -> Result<bool, error::SystemError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM public_assets WHERE organization_id = $1 AND asset_key = $2)",
        )
        .bind(organization_id)
        .bind(asset_key)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn create(
        &self,
        asset: &NewPublicAsset,
    ) -> Result<PublicAssetEntity, error::SystemError> {
        let entity = sqlx::query_as::<_, PublicAssetEntity>(
            r#"
            INSERT INTO public_assets
                (id, organization_id, user_id, asset_key, asset_type, original_filename, mime_type,
                 size_bytes, width, height, storage_path, public_url, tags)
            VALUES ($1, $2, $3, $4, 'file', $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(asset.id)
        .bind(asset.organization_id)
        .bind(asset.user_id)
        .bind(&asset.asset_key)
        .bind(&asset.original_filename)
        .bind(&asset.mime_type)
        .bind(asset.size_bytes)
        .bind(asset.width)
        .bind(asset.height)
        .bind(&asset.storage_path)
        .bind(&asset.public_url)
        .bind(&asset.tags)
        .fetch_one(&self.pool)
        .await?;

        Ok(entity)
    }

    async fn find_by_id(
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

    async fn list(
        &self,
        organization_id: &Uuid,
        filter: &PublicAssetFilter,
    ) -> Result<Vec<PublicAssetEntity>, error::SystemError> {
        let search = filter
            .search
            .as_ref()
            .map(|s| format!("%{}%", s.replace('%', "\\%").replace('_', "\\_")));

        let assets = sqlx::query_as::<_, PublicAssetEntity>(
            r#"
            SELECT * FROM public_assets
            WHERE organization_id = $1
            AND ($2::boolean OR is_active)
            AND ($3::text IS NULL OR asset_type = $3)
            AND ($4::text IS NULL OR $4 = ANY(tags))
            AND ($5::text IS NULL OR asset_key ILIKE $5 OR original_filename ILIKE $5)
            ORDER BY created_at DESC
            LIMIT $6 OFFSET $7
            "#,
        )
        .bind(organization_id)
        .bind(filter.include_inactive)
        .bind(&filter.asset_type)
        .bind(&filter.tag)
        .bind(&search)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(assets)
    }

    async fn record_usage(
        &self,
        organization_id: &Uuid,
        asset_id: &Uuid,
    ) -> Result<Option<PublicAssetEntity>, error::SystemError> {
        let asset = sqlx::query_as::<_, PublicAssetEntity>(
            r#"
            UPDATE public_assets
            SET usage_count = usage_count + 1, last_accessed_at = NOW()
            WHERE id = $1 AND organization_id = $2
            RETURNING *
            "#,
        )
        .bind(asset_id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(asset)
    }

    async fn set_tags(
        &self,
        organization_id: &Uuid,
        asset_id: &Uuid,
        tags: &[String],
    ) -> Result<Option<PublicAssetEntity>, error::SystemError> {
        let asset = sqlx::query_as::<_, PublicAssetEntity>(
            r#"
            UPDATE public_assets
            SET tags = $3, updated_at = NOW()
            WHERE id = $1 AND organization_id = $2
            RETURNING *
            "#,
        )
        .bind(asset_id)
        .bind(organization_id)
        .bind(tags)
        .fetch_optional(&self.pool)
        .await?;

        Ok(asset)
    }

    async fn deactivate(
        &self,
        organization_id: &Uuid,
        asset_id: &Uuid,
    ) -> Result<bool, error::SystemError> {
        let rows = sqlx::query(
            r#"
            UPDATE public_assets SET is_active = FALSE, updated_at = NOW()
            WHERE id = $1 AND organization_id = $2 AND is_active
            "#,
        )
        .bind(asset_id)
        .bind(organization_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows > 0)
    }

    async fn delete(
        &self,
        organization_id: &Uuid,
        asset_id: &Uuid,
    ) -> Result<bool, error::SystemError> {
        let rows = sqlx::query("DELETE FROM public_assets WHERE id = $1 AND organization_id = $2")
            .bind(asset_id)
            .bind(organization_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows > 0)
    }
}

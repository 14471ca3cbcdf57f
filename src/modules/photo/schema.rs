use serde::Serialize;
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PhotoSizeEntity {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub size_key: String,
    pub width: i32,
    pub height: i32,
    pub storage_path: String,
    pub public_url: String,
    pub file_size: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// The four denormalized URL columns of an owning user or organization row.
#[derive(Debug, Clone, Default, FromRow)]
pub struct PhotoUrlsRow {
    pub url_50: Option<String>,
    pub url_100: Option<String>,
    pub url_200: Option<String>,
    pub url_400: Option<String>,
}

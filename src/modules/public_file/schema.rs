use serde::Serialize;
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// A stored file tracked in `public_assets`: avatars, logos and generic uploads.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicAssetEntity {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub user_id: Option<Uuid>,
    pub asset_key: String,
    pub asset_type: String,
    pub original_filename: Option<String>,
    pub mime_type: String,
    pub size_bytes: i64,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub aspect_ratio: Option<f64>,
    #[serde(skip_serializing)]
    pub storage_path: String,
    pub public_url: String,
    pub tags: Vec<String>,
    pub is_active: bool,
    pub usage_count: i64,
    pub last_accessed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

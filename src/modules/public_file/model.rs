use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// New file metadata to insert into database
#[derive(Debug, Clone)]
pub struct NewPublicAsset {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub user_id: Option<Uuid>,
    pub asset_key: String,
    pub original_filename: Option<String>,
    pub mime_type: String,
    pub size_bytes: i64,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub storage_path: String,
    pub public_url: String,
    pub tags: Vec<String>,
}

/// File upload configuration
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub max_file_size: usize,
    pub allowed_mime_types: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: 10 * 1024 * 1024, // 10MB
            allowed_mime_types: vec![
                "image/jpeg".to_string(),
                "image/png".to_string(),
                "image/gif".to_string(),
                "image/webp".to_string(),
                "image/svg+xml".to_string(),
                "application/pdf".to_string(),
                "text/plain".to_string(),
                "text/csv".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub struct PublicFileUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
    pub asset_key: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ListPublicFilesQuery {
    pub asset_type: Option<String>,
    #[validate(length(min = 1, max = 64, message = "Tag must be 1-64 characters"))]
    pub tag: Option<String>,
    #[validate(length(min = 1, max = 200, message = "Search must be 1-200 characters"))]
    pub search: Option<String>,
    pub include_inactive: Option<bool>,
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: Option<i64>,
    #[validate(range(min = 0, message = "Offset cannot be negative"))]
    pub offset: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct PublicAssetFilter {
    pub asset_type: Option<String>,
    pub tag: Option<String>,
    pub search: Option<String>,
    pub include_inactive: bool,
    pub limit: i64,
    pub offset: i64,
}

impl From<ListPublicFilesQuery> for PublicAssetFilter {
    fn from(query: ListPublicFilesQuery) -> Self {
        PublicAssetFilter {
            asset_type: query.asset_type,
            tag: query.tag.map(|t| t.trim().to_lowercase()),
            search: query.search,
            include_inactive: query.include_inactive.unwrap_or(false),
            limit: query.limit.unwrap_or(50),
            offset: query.offset.unwrap_or(0),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddTagsBody {
    #[validate(length(min = 1, max = 50, message = "Provide between 1 and 50 tags"))]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    pub hard: Option<bool>,
}

/// Trimmed, lowercased, non-empty tags in order of first appearance.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim().to_lowercase();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

/// Existing tags followed by the new ones not already present.
pub fn merge_tags(existing: &[String], incoming: &[String]) -> Vec<String> {
    normalize_tags(existing.iter().chain(incoming.iter()))
}

/// Form field `tags`: a JSON array or a comma separated list.
pub fn parse_tag_field(raw: &str) -> Vec<String> {
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(tags) => normalize_tags(tags),
        Err(_) => normalize_tags(raw.split(',')),
    }
}

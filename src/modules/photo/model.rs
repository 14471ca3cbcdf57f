use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::modules::photo::schema::PhotoUrlsRow;

/// Fixed square renditions, ascending.
pub const PHOTO_SIZES: [u32; 4] = [50, 100, 200, 400];
pub const ORIGINAL_QUALITY: f32 = 90.0;
pub const DERIVATIVE_QUALITY: f32 = 85.0;
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;
pub const ALLOWED_PHOTO_TYPES: [&str; 5] =
    ["image/jpeg", "image/jpg", "image/png", "image/gif", "image/webp"];

/// Size in pixels to public URL.
pub type PhotoUrls = BTreeMap<u32, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoKind {
    Avatar,
    Logo,
}

impl PhotoKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhotoKind::Avatar => "avatar",
            PhotoKind::Logo => "logo",
        }
    }
}

/// Row that carries the denormalized photo URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoEntity {
    #[serde(alias = "avatar", alias = "users")]
    User,
    #[serde(alias = "logo", alias = "organizations")]
    Organization,
}

impl From<PhotoKind> for PhotoEntity {
    fn from(kind: PhotoKind) -> Self {
        match kind {
            PhotoKind::Avatar => PhotoEntity::User,
            PhotoKind::Logo => PhotoEntity::Organization,
        }
    }
}

/// Input of the upload pipeline.
#[derive(Debug, Clone)]
pub struct PhotoUploadRequest {
    pub bytes: Vec<u8>,
    pub kind: PhotoKind,
    pub organization_id: Uuid,
    /// Avatar owner; defaults to the uploader.
    pub user_id: Option<Uuid>,
    pub aspect_ratio: Option<f64>,
    pub uploaded_by: Uuid,
}

#[derive(Debug, Clone)]
pub struct NewPhotoAsset {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub user_id: Option<Uuid>,
    pub asset_key: String,
    pub asset_type: &'static str,
    pub width: i32,
    pub height: i32,
    pub aspect_ratio: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct StoredOriginal {
    pub storage_path: String,
    pub public_url: String,
    pub size_bytes: i64,
}

#[derive(Debug, Clone)]
pub struct NewPhotoSize {
    pub asset_id: Uuid,
    pub size: u32,
    pub storage_path: String,
    pub public_url: String,
    pub file_size: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoUpload {
    pub asset_id: Uuid,
    pub original_url: String,
    pub urls: PhotoUrls,
}

#[derive(Debug, Deserialize)]
pub struct PhotoPath {
    pub entity_type: PhotoEntity,
    pub entity_id: Uuid,
}

impl PhotoUrlsRow {
    /// `None` when no rendition is linked.
    pub fn into_urls(self) -> Option<PhotoUrls> {
        let urls: PhotoUrls = PHOTO_SIZES
            .into_iter()
            .zip([self.url_50, self.url_100, self.url_200, self.url_400])
            .filter_map(|(size, url)| url.map(|u| (size, u)))
            .collect();

        if urls.is_empty() {
            None
        } else {
            Some(urls)
        }
    }
}

/// Accepts `"16:9"`, `"16/9"` or a plain ratio such as `"1.5"`.
pub fn parse_aspect_ratio(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let ratio = match raw.split_once([':', '/']) {
        Some((w, h)) => {
            let w: f64 = w.trim().parse().ok()?;
            let h: f64 = h.trim().parse().ok()?;
            if h == 0.0 {
                return None;
            }
            w / h
        }
        None => raw.parse().ok()?,
    };

    (ratio.is_finite() && ratio > 0.0).then_some(ratio)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_ratio_forms() {
        assert_eq!(parse_aspect_ratio("16:9"), Some(16.0 / 9.0));
        assert_eq!(parse_aspect_ratio("4/3"), Some(4.0 / 3.0));
        assert_eq!(parse_aspect_ratio(" 1 "), Some(1.0));
        assert_eq!(parse_aspect_ratio("1:0"), None);
        assert_eq!(parse_aspect_ratio("-2"), None);
        assert_eq!(parse_aspect_ratio("wide"), None);
    }

    #[test]
    fn empty_url_row_means_no_photo() {
        assert!(PhotoUrlsRow::default().into_urls().is_none());

        let row = PhotoUrlsRow { url_50: Some("a".into()), url_400: Some("d".into()), ..Default::default() };
        let urls = row.into_urls().unwrap();
        assert_eq!(urls.keys().copied().collect::<Vec<_>>(), vec![50, 400]);
    }

    #[test]
    fn entity_path_accepts_kind_aliases() {
        let entity: PhotoEntity = serde_json::from_str("\"logo\"").unwrap();
        assert_eq!(entity, PhotoEntity::Organization);
        let entity: PhotoEntity = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(entity, PhotoEntity::User);
    }

    #[test]
    fn urls_serialize_with_string_keys() {
        let upload = PhotoUpload {
            asset_id: Uuid::nil(),
            original_url: "o".into(),
            urls: PHOTO_SIZES.into_iter().map(|s| (s, format!("u{s}"))).collect(),
        };
        let json = serde_json::to_value(&upload).unwrap();
        assert_eq!(json["urls"]["50"], "u50");
        assert_eq!(json["urls"]["400"], "u400");
        assert!(json.get("assetId").is_some());
    }
}

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const COMMUNITY_TIER: &str = "community";

pub type LicenseFeatures = BTreeMap<String, bool>;

/// Feature flags of an unlicensed installation.
pub fn community_features() -> LicenseFeatures {
    [
        ("api_access", true),
        ("advanced_analytics", false),
        ("email_security", false),
        ("lifecycle_automation", false),
        ("signature_campaigns", false),
        ("custom_branding", false),
        ("priority_support", false),
    ]
    .into_iter()
    .map(|(name, enabled)| (name.to_string(), enabled))
    .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseInfo {
    pub valid: bool,
    pub tier: String,
    pub features: LicenseFeatures,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_users: Option<i64>,
    pub validated_at: DateTime<Utc>,
}

impl LicenseInfo {
    pub fn community() -> Self {
        LicenseInfo {
            valid: true,
            tier: COMMUNITY_TIER.to_string(),
            features: community_features(),
            expires_at: None,
            max_users: None,
            validated_at: Utc::now(),
        }
    }
}

/// Body POSTed to the license server.
#[derive(Debug, Serialize)]
pub struct ValidationRequest<'a> {
    pub license_key: &'a str,
    pub instance_id: &'a str,
    pub version: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ValidationResponse {
    pub valid: bool,
    pub tier: String,
    #[serde(default)]
    pub features: LicenseFeatures,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_users: Option<i64>,
}

impl ValidationResponse {
    /// A rejected key keeps its tier for display but only unlocks community features.
    pub fn into_info(self, validated_at: DateTime<Utc>) -> LicenseInfo {
        let features = if self.valid { self.features } else { community_features() };
        LicenseInfo {
            valid: self.valid,
            tier: self.tier,
            features,
            expires_at: self.expires_at,
            max_users: self.max_users,
            validated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LicenseConfig {
    pub license_key: Option<String>,
    pub url: String,
    pub instance_id: String,
    pub version: String,
}

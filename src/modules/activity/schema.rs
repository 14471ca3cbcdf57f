use serde::Serialize;
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogEntity {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub user_id: Option<Uuid>,
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub description: String,
    pub metadata: serde_json::Value,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_camel_case_keys() {
        let entry = ActivityLogEntity {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            user_id: None,
            action: "email_security.search".into(),
            resource_type: "email".into(),
            resource_id: Some("msg-1".into()),
            description: "Searched mailboxes".into(),
            metadata: serde_json::json!({ "results": 2 }),
            created_at: chrono::Utc::now(),
        };

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["resourceType"], "email");
        assert_eq!(value["resourceId"], "msg-1");
        assert!(value["organizationId"].is_string());
        assert!(value["createdAt"].is_string());
        assert!(value.get("resource_type").is_none());
    }
}

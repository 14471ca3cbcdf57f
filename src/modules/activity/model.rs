use uuid::Uuid;

/// Audit entry to append to `activity_logs`.
#[derive(Debug, Clone)]
pub struct NewActivityLog {
    pub organization_id: Uuid,
    pub user_id: Option<Uuid>,
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub description: String,
    pub metadata: serde_json::Value,
}

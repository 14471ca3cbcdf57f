use serde::{Deserialize, Serialize};
use sqlx::{
    prelude::{FromRow, Type},
    types::Json,
};
use uuid::Uuid;

use crate::modules::workflow::model::WorkflowStep;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Type, Serialize, Deserialize)]
#[sqlx(type_name = "workflow_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum WorkflowType {
    Onboarding,
    Offboarding,
    Custom,
}

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowEntity {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub workflow_type: WorkflowType,
    pub steps: Json<Vec<WorkflowStep>>,
    pub is_active: bool,
    pub created_by: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::modules::workflow::schema::WorkflowType;

fn validate_config(config: &serde_json::Value) -> Result<(), ValidationError> {
    if config.is_object() {
        Ok(())
    } else {
        Err(ValidationError::new("config_not_object"))
    }
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    let len = name.trim().chars().count();
    if (1..=200).contains(&len) {
        Ok(())
    } else {
        Err(ValidationError::new("name_length"))
    }
}

fn default_config() -> serde_json::Value {
    serde_json::Value::Object(Default::default())
}

/// One action of an onboarding/offboarding timeline, scheduled relative to the
/// trigger date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStep {
    #[validate(length(min = 1, max = 200, message = "Step name must be 1-200 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 100, message = "Step action must be 1-100 characters"))]
    pub action: String,
    #[serde(default)]
    #[validate(range(min = -365, max = 365, message = "Step offset must be within a year"))]
    pub offset_days: i32,
    #[serde(default = "default_config")]
    #[validate(custom(function = "validate_config", message = "Step config must be an object"))]
    pub config: serde_json::Value,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkflowModel {
    #[validate(custom(function = "validate_name", message = "Name must be 1-200 characters"))]
    pub name: String,
    #[validate(length(max = 2000, message = "Description is too long"))]
    pub description: Option<String>,
    pub workflow_type: WorkflowType,
    #[validate(length(min = 1, message = "A workflow needs at least one step"), nested)]
    pub steps: Vec<WorkflowStep>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWorkflowModel {
    #[validate(custom(function = "validate_name", message = "Name must be 1-200 characters"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "crate::utils::double_option")]
    pub description: Option<Option<String>>,
    pub workflow_type: Option<WorkflowType>,
    #[validate(length(min = 1, message = "A workflow needs at least one step"), nested)]
    pub steps: Option<Vec<WorkflowStep>>,
    pub is_active: Option<bool>,
}

impl UpdateWorkflowModel {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.workflow_type.is_none()
            && self.steps.is_none()
            && self.is_active.is_none()
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ListWorkflowsQuery {
    #[serde(rename = "type")]
    pub workflow_type: Option<WorkflowType>,
    pub active: Option<bool>,
}

pub struct InsertWorkflow {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub workflow_type: WorkflowType,
    pub steps: Vec<WorkflowStep>,
    pub is_active: bool,
    pub created_by: Uuid,
}

pub struct UpdateWorkflow {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub workflow_type: Option<WorkflowType>,
    pub steps: Option<Vec<WorkflowStep>>,
    pub is_active: Option<bool>,
}

impl From<UpdateWorkflowModel> for UpdateWorkflow {
    fn from(model: UpdateWorkflowModel) -> Self {
        UpdateWorkflow {
            name: model.name.map(|n| n.trim().to_string()),
            description: model.description,
            workflow_type: model.workflow_type,
            steps: model.steps,
            is_active: model.is_active,
        }
    }
}

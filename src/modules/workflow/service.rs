use std::sync::Arc;
use uuid::Uuid;

use crate::{
    api::error,
    modules::workflow::{
        model::{CreateWorkflowModel, InsertWorkflow, ListWorkflowsQuery, UpdateWorkflowModel},
        repository::WorkflowRepository,
        schema::WorkflowEntity,
    },
};

#[derive(Clone)]
pub struct WorkflowService {
    repo: Arc<dyn WorkflowRepository + Send + Sync>,
}

impl WorkflowService {
    pub fn with_dependencies(repo: Arc<dyn WorkflowRepository + Send + Sync>) -> Self {
        WorkflowService { repo }
    }

    pub async fn list(
        &self,
        organization_id: Uuid,
        query: ListWorkflowsQuery,
    ) -> Result<Vec<WorkflowEntity>, error::SystemError> {
        self.repo.find_all(&organization_id, &query).await
    }

    pub async fn get(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> Result<WorkflowEntity, error::SystemError> {
        self.repo
            .find_by_id(&organization_id, &id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Workflow not found"))
    }

    pub async fn create(
        &self,
        organization_id: Uuid,
        created_by: Uuid,
        model: CreateWorkflowModel,
    ) -> Result<WorkflowEntity, error::SystemError> {
        let name = model.name.trim();
        if name.is_empty() {
            return Err(error::SystemError::bad_request("Name must be 1-200 characters"));
        }

        let workflow = InsertWorkflow {
            id: Uuid::now_v7(),
            organization_id,
            name: name.to_string(),
            description: model.description,
            workflow_type: model.workflow_type,
            steps: model.steps,
            is_active: model.is_active.unwrap_or(true),
            created_by,
        };

        self.repo.create(&workflow).await
    }

    pub async fn update(
        &self,
        organization_id: Uuid,
        id: Uuid,
        model: UpdateWorkflowModel,
    ) -> Result<WorkflowEntity, error::SystemError> {
        if model.is_empty() {
            return Err(error::SystemError::bad_request("No fields to update"));
        }
        if model.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(error::SystemError::bad_request("Name must be 1-200 characters"));
        }

        self.repo
            .update(&organization_id, &id, &model.into())
            .await?
            .ok_or_else(|| error::SystemError::not_found("Workflow not found"))
    }

    pub async fn delete(&self, organization_id: Uuid, id: Uuid) -> Result<(), error::SystemError> {
        if !self.repo.delete(&organization_id, &id).await? {
            return Err(error::SystemError::not_found("Workflow not found"));
        }
        Ok(())
    }
}

use uuid::Uuid;

use crate::{
    api::error,
    modules::workflow::{
        model::{InsertWorkflow, ListWorkflowsQuery, UpdateWorkflow},
        schema::WorkflowEntity,
    },
};

#[async_trait::async_trait]
pub trait WorkflowRepository {
    async fn find_all(
        &self,
        organization_id: &Uuid,
        query: &ListWorkflowsQuery,
    ) -> Result<Vec<WorkflowEntity>, error::SystemError>;

    async fn find_by_id(
        &self,
        organization_id: &Uuid,
        id: &Uuid,
    ) -> Result<Option<WorkflowEntity>, error::SystemError>;

    async fn create(&self, workflow: &InsertWorkflow)
        -> Result<WorkflowEntity, error::SystemError>;

    async fn update(
        &self,
        organization_id: &Uuid,
        id: &Uuid,
        workflow: &UpdateWorkflow,
    ) -> Result<Option<WorkflowEntity>, error::SystemError>;

    async fn delete(&self, organization_id: &Uuid, id: &Uuid) -> Result<bool, error::SystemError>;
}

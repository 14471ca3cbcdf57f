use sqlx::types::Json;
use uuid::Uuid;

use crate::{
    api::error,
    modules::workflow::{
        model::{InsertWorkflow, ListWorkflowsQuery, UpdateWorkflow},
        repository::WorkflowRepository,
        schema::WorkflowEntity,
    },
};

#[derive(Clone)]
pub struct WorkflowRepositoryPg {
    pool: sqlx::PgPool,
}

impl WorkflowRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl WorkflowRepository for WorkflowRepositoryPg {
    async fn find_all(
        &self,
        organization_id: &Uuid,
        query: &ListWorkflowsQuery,
    ) -> Result<Vec<WorkflowEntity>, error::SystemError> {
        let workflows = sqlx::query_as::<_, WorkflowEntity>(
            r#"
            SELECT * FROM workflows
            WHERE organization_id = $1
            AND ($2::workflow_type IS NULL OR workflow_type = $2)
            AND ($3::boolean IS NULL OR is_active = $3)
            ORDER BY created_at DESC
            "#,
        )
        .bind(organization_id)
        .bind(query.workflow_type)
        .bind(query.active)
        .fetch_all(&self.pool)
        .await?;

        Ok(workflows)
    }

    async fn find_by_id(
        &self,
        organization_id: &Uuid,
        id: &Uuid,
    ) -> Result<Option<WorkflowEntity>, error::SystemError> {
        let workflow = sqlx::query_as::<_, WorkflowEntity>(
            "SELECT * FROM workflows WHERE id = $1 AND organization_id = $2",
        )
        .bind(id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(workflow)
    }

    async fn create(
        &self,
        workflow: &InsertWorkflow,
    ) -> Result<WorkflowEntity, error::SystemError> {
        let entity = sqlx::query_as::<_, WorkflowEntity>(
            r#"
            INSERT INTO workflows
                (id, organization_id, name, description, workflow_type, steps, is_active, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(workflow.id)
        .bind(workflow.organization_id)
        .bind(&workflow.name)
        .bind(&workflow.description)
        .bind(workflow.workflow_type)
        .bind(Json(&workflow.steps))
        .bind(workflow.is_active)
        .bind(workflow.created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(entity)
    }

    async fn update(
        &self,
        organization_id: &Uuid,
        id: &Uuid,
        workflow: &UpdateWorkflow,
    ) -> Result<Option<WorkflowEntity>, error::SystemError> {
        let entity = sqlx::query_as::<_, WorkflowEntity>(
            r#"
            UPDATE workflows
            SET
                name          = COALESCE($3, name),
                description   = CASE WHEN $4::boolean THEN $5 ELSE description END,
                workflow_type = COALESCE($6, workflow_type),
                steps         = COALESCE($7, steps),
                is_active     = COALESCE($8, is_active),
                updated_at    = NOW()
            WHERE id = $1 AND organization_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(organization_id)
        .bind(&workflow.name) // $3: Option<String>
        .bind(workflow.description.is_some()) // $4: bool - was description provided?
        .bind(workflow.description.as_ref().and_then(|v| v.as_ref())) // $5: Option<&String>
        .bind(workflow.workflow_type) // $6: Option<WorkflowType>
        .bind(workflow.steps.as_ref().map(Json)) // $7: Option<Json<&Vec<WorkflowStep>>>
        .bind(workflow.is_active) // $8: Option<bool>
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity)
    }

    async fn delete(&self, organization_id: &Uuid, id: &Uuid) -> Result<bool, error::SystemError> {
        let rows = sqlx::query("DELETE FROM workflows WHERE id = $1 AND organization_id = $2")
            .bind(id)
            .bind(organization_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows > 0)
    }
}

use actix_web::{delete, get, post, put, web, HttpRequest};
use uuid::Uuid;

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::workflow::{
        model::{CreateWorkflowModel, ListWorkflowsQuery, UpdateWorkflowModel},
        schema::WorkflowEntity,
        service::WorkflowService,
    },
    utils::{ValidatedJson, ValidatedQuery},
};

#[get("")]
pub async fn list_workflows(
    workflow_service: web::Data<WorkflowService>,
    query: ValidatedQuery<ListWorkflowsQuery>,
    req: HttpRequest,
) -> Result<success::Success<Vec<WorkflowEntity>>, error::Error> {
    let org = get_claims(&req)?.org;
    let workflows = workflow_service.list(org, query.0).await?;
    Ok(success::Success::ok(Some(workflows)))
}

#[post("")]
pub async fn create_workflow(
    workflow_service: web::Data<WorkflowService>,
    body: ValidatedJson<CreateWorkflowModel>,
    req: HttpRequest,
) -> Result<success::Success<WorkflowEntity>, error::Error> {
    let claims = get_claims(&req)?;
    let workflow = workflow_service.create(claims.org, claims.sub, body.0).await?;
    Ok(success::Success::created(Some(workflow)).message("Workflow created successfully"))
}

#[get("/{id}")]
pub async fn get_workflow(
    workflow_service: web::Data<WorkflowService>,
    id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<WorkflowEntity>, error::Error> {
    let org = get_claims(&req)?.org;
    let workflow = workflow_service.get(org, id.into_inner()).await?;
    Ok(success::Success::ok(Some(workflow)))
}

#[put("/{id}")]
pub async fn update_workflow(
    workflow_service: web::Data<WorkflowService>,
    id: web::Path<Uuid>,
    body: ValidatedJson<UpdateWorkflowModel>,
    req: HttpRequest,
) -> Result<success::Success<WorkflowEntity>, error::Error> {
    let org = get_claims(&req)?.org;
    let workflow = workflow_service.update(org, id.into_inner(), body.0).await?;
    Ok(success::Success::ok(Some(workflow)).message("Workflow updated successfully"))
}

#[delete("/{id}")]
pub async fn delete_workflow(
    workflow_service: web::Data<WorkflowService>,
    id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let org = get_claims(&req)?.org;
    workflow_service.delete(org, id.into_inner()).await?;
    Ok(success::Success::ok(None).message("Workflow deleted successfully"))
}

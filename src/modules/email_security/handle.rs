use actix_web::{get, post, web, HttpRequest};

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::{
        activity::ActivityLogEntity,
        email_security::{
            model::{DeleteMessagesBody, DeleteResult, HistoryQuery, SearchMessagesQuery, SearchResult},
            service::EmailSecurityService,
        },
    },
    utils::{ValidatedJson, ValidatedQuery},
};

#[get("/search")]
pub async fn search_messages(
    email_security_service: web::Data<EmailSecurityService>,
    query: ValidatedQuery<SearchMessagesQuery>,
    req: HttpRequest,
) -> Result<success::Success<SearchResult>, error::Error> {
    let claims = get_claims(&req)?;
    let result = email_security_service.search(claims.org, claims.sub, query.0).await?;
    Ok(success::Success::ok(Some(result)))
}

#[post("/delete")]
pub async fn delete_messages(
    email_security_service: web::Data<EmailSecurityService>,
    body: ValidatedJson<DeleteMessagesBody>,
    req: HttpRequest,
) -> Result<success::Success<DeleteResult>, error::Error> {
    let claims = get_claims(&req)?;
    let result = email_security_service.delete(claims.org, claims.sub, body.0).await?;
    let message = format!("Deleted {} of {} messages", result.deleted, result.requested);
    Ok(success::Success::ok(Some(result)).message(message))
}

#[get("/history")]
pub async fn history(
    email_security_service: web::Data<EmailSecurityService>,
    query: ValidatedQuery<HistoryQuery>,
    req: HttpRequest,
) -> Result<success::Success<Vec<ActivityLogEntity>>, error::Error> {
    let org = get_claims(&req)?.org;
    let logs = email_security_service.history(org, query.0).await?;
    Ok(success::Success::ok(Some(logs)))
}

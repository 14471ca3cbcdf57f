use actix_multipart::Multipart;
use actix_web::{delete, get, post, web, HttpRequest};
use uuid::Uuid;

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::public_file::{
        model::{parse_tag_field, AddTagsBody, DeleteQuery, ListPublicFilesQuery, PublicFileUpload},
        schema::PublicAssetEntity,
        service::PublicFileService,
    },
    utils::{multipart::read_upload_form, ValidatedJson, ValidatedQuery},
};

/// Cap for reading the multipart stream; the service applies the configured limit.
const MAX_MULTIPART_BYTES: usize = 10 * 1024 * 1024;

#[post("/upload")]
pub async fn upload_file(
    file_service: web::Data<PublicFileService>,
    payload: Multipart,
    req: HttpRequest,
) -> Result<success::Success<PublicAssetEntity>, error::Error> {
    let claims = get_claims(&req)?;
    let form = read_upload_form(payload, "file", MAX_MULTIPART_BYTES).await?;

    let asset_key = form.field("asset_key").map(str::to_string);
    let tags = form.field("tags").map(parse_tag_field).unwrap_or_default();
    let file = form.file.ok_or_else(|| error::Error::bad_request("No file found in request"))?;
    let filename = file.filename.ok_or_else(|| error::Error::bad_request("Missing filename"))?;

    let upload = PublicFileUpload {
        filename,
        bytes: file.bytes,
        content_type: file.content_type,
        asset_key,
        tags,
    };
    let asset = file_service.upload(claims.org, claims.sub, upload).await?;
    Ok(success::Success::created(Some(asset)).message("File uploaded successfully"))
}

#[get("")]
pub async fn list_files(
    file_service: web::Data<PublicFileService>,
    query: ValidatedQuery<ListPublicFilesQuery>,
    req: HttpRequest,
) -> Result<success::Success<Vec<PublicAssetEntity>>, error::Error> {
    let claims = get_claims(&req)?;
    let assets = file_service.list(claims.org, query.0.into()).await?;
    Ok(success::Success::ok(Some(assets)))
}

#[get("/{asset_id}")]
pub async fn get_file(
    file_service: web::Data<PublicFileService>,
    asset_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<PublicAssetEntity>, error::Error> {
    let claims = get_claims(&req)?;
    let asset = file_service.get(claims.org, asset_id.into_inner()).await?;
    Ok(success::Success::ok(Some(asset)))
}

#[post("/{asset_id}/usage")]
pub async fn record_usage(
    file_service: web::Data<PublicFileService>,
    asset_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<PublicAssetEntity>, error::Error> {
    let claims = get_claims(&req)?;
    let asset = file_service.record_usage(claims.org, asset_id.into_inner()).await?;
    Ok(success::Success::ok(Some(asset)))
}

#[post("/{asset_id}/tag")]
pub async fn add_tags(
    file_service: web::Data<PublicFileService>,
    asset_id: web::Path<Uuid>,
    body: ValidatedJson<AddTagsBody>,
    req: HttpRequest,
) -> Result<success::Success<PublicAssetEntity>, error::Error> {
    let claims = get_claims(&req)?;
    let asset = file_service.add_tags(claims.org, asset_id.into_inner(), body.0.tags).await?;
    Ok(success::Success::ok(Some(asset)).message("Tags updated successfully"))
}

#[delete("/{asset_id}")]
pub async fn delete_file(
    file_service: web::Data<PublicFileService>,
    asset_id: web::Path<Uuid>,
    query: web::Query<DeleteQuery>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let claims = get_claims(&req)?;
    let hard = query.hard.unwrap_or(false);
    if hard && !claims.is_admin() {
        return Err(error::Error::forbidden("Only admins can permanently delete files"));
    }
    file_service.delete(claims.org, asset_id.into_inner(), hard).await?;
    Ok(success::Success::ok(None).message("File deleted successfully"))
}

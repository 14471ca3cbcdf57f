use actix_multipart::Multipart;
use actix_web::{delete, get, post, web, HttpRequest};
use uuid::Uuid;

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::photo::{
        model::{
            parse_aspect_ratio, PhotoKind, PhotoPath, PhotoUpload, PhotoUploadRequest, PhotoUrls,
            ALLOWED_PHOTO_TYPES, MAX_PHOTO_BYTES,
        },
        service::PhotoService,
    },
    utils::{
        multipart::{read_upload_form, UploadForm},
        Claims,
    },
};

fn build_request(
    form: UploadForm,
    kind: PhotoKind,
    claims: &Claims,
) -> Result<PhotoUploadRequest, error::Error> {
    let aspect_ratio = match form.field("aspectRatio") {
        Some(raw) => Some(
            parse_aspect_ratio(raw).ok_or_else(|| error::Error::bad_request("Invalid aspect ratio"))?,
        ),
        None => None,
    };

    let user_id = match form.field("userId") {
        Some(raw) => {
            let id = Uuid::parse_str(raw).map_err(|_| error::Error::bad_request("Invalid userId"))?;
            if id != claims.sub && !claims.is_admin() {
                return Err(error::Error::forbidden("Only admins can change another user's photo"));
            }
            Some(id)
        }
        None => None,
    };

    let file = form.file.ok_or_else(|| error::Error::bad_request("No photo uploaded"))?;
    let content_type = file.content_type.unwrap_or_default();
    if !ALLOWED_PHOTO_TYPES.contains(&content_type.as_str()) {
        return Err(error::Error::bad_request("Only image files are allowed"));
    }

    Ok(PhotoUploadRequest {
        bytes: file.bytes,
        kind,
        organization_id: claims.org,
        user_id,
        aspect_ratio,
        uploaded_by: claims.sub,
    })
}

#[post("/upload-avatar")]
pub async fn upload_avatar(
    photo_service: web::Data<PhotoService>,
    payload: Multipart,
    req: HttpRequest,
) -> Result<success::Success<PhotoUpload>, error::Error> {
    let claims = get_claims(&req)?;
    let form = read_upload_form(payload, "photo", MAX_PHOTO_BYTES).await?;
    let request = build_request(form, PhotoKind::Avatar, &claims)?;

    let upload = photo_service.upload_photo(request).await?;
    Ok(success::Success::created(Some(upload)).message("Avatar uploaded successfully"))
}

#[post("/upload-logo")]
pub async fn upload_logo(
    photo_service: web::Data<PhotoService>,
    payload: Multipart,
    req: HttpRequest,
) -> Result<success::Success<PhotoUpload>, error::Error> {
    let claims = get_claims(&req)?;
    if !claims.is_admin() {
        return Err(error::Error::forbidden("Only admins can change the organization logo"));
    }
    let form = read_upload_form(payload, "photo", MAX_PHOTO_BYTES).await?;
    let request = build_request(form, PhotoKind::Logo, &claims)?;

    let upload = photo_service.upload_photo(request).await?;
    Ok(success::Success::created(Some(upload)).message("Logo uploaded successfully"))
}

#[get("/{entity_type}/{entity_id}")]
pub async fn get_photo_urls(
    photo_service: web::Data<PhotoService>,
    path: web::Path<PhotoPath>,
    req: HttpRequest,
) -> Result<success::Success<PhotoUrls>, error::Error> {
    let org = get_claims(&req)?.org;
    let PhotoPath { entity_type, entity_id } = path.into_inner();
    let urls = photo_service
        .get_photo_urls(entity_type, org, entity_id)
        .await?
        .ok_or_else(|| error::Error::not_found("Photo not found"))?;
    Ok(success::Success::ok(Some(urls)))
}

#[delete("/{asset_id}")]
pub async fn delete_photo(
    photo_service: web::Data<PhotoService>,
    asset_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let claims = get_claims(&req)?;
    let restrict_to = (!claims.is_admin()).then_some(claims.sub);
    photo_service.delete_photo(claims.org, asset_id.into_inner(), restrict_to).await?;
    Ok(success::Success::ok(None).message("Photo deleted successfully"))
}

use actix_web::{get, post, web, HttpRequest};

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::license::{
        model::{LicenseFeatures, LicenseInfo},
        service::LicenseService,
    },
};

#[get("")]
pub async fn get_license(
    license_service: web::Data<LicenseService>,
) -> Result<success::Success<LicenseInfo>, error::Error> {
    let info = license_service.get_license().await;
    Ok(success::Success::ok(Some(info)))
}

#[get("/features")]
pub async fn get_features(
    license_service: web::Data<LicenseService>,
) -> Result<success::Success<LicenseFeatures>, error::Error> {
    let features = license_service.get_features().await;
    Ok(success::Success::ok(Some(features)))
}

#[derive(serde::Serialize)]
pub struct FeatureStatus {
    pub feature: String,
    pub enabled: bool,
}

#[get("/features/{feature}")]
pub async fn get_feature(
    license_service: web::Data<LicenseService>,
    feature: web::Path<String>,
) -> Result<success::Success<FeatureStatus>, error::Error> {
    let feature = feature.into_inner();
    let enabled = license_service.has_feature(&feature).await;
    Ok(success::Success::ok(Some(FeatureStatus { feature, enabled })))
}

#[post("/refresh")]
pub async fn refresh_license(
    license_service: web::Data<LicenseService>,
    req: HttpRequest,
) -> Result<success::Success<LicenseInfo>, error::Error> {
    if !get_claims(&req)?.is_admin() {
        return Err(error::Error::forbidden("Only admins can refresh the license"));
    }
    let info = license_service.validate().await;
    Ok(success::Success::ok(Some(info)).message("License revalidated"))
}

use actix_web::web::{scope, ServiceConfig};

use crate::modules::license::handle::*;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/license")
            .service(get_license)
            .service(get_features)
            .service(get_feature)
            .service(refresh_license),
    );
}

use actix_web::web::{scope, ServiceConfig};

use crate::modules::photo::handle::*;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/photos")
            .service(upload_avatar)
            .service(upload_logo)
            .service(get_photo_urls)
            .service(delete_photo),
    );
}

use actix_web::web::{scope, ServiceConfig};

use crate::modules::public_file::handle::*;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/public-files")
            .service(upload_file)
            .service(list_files)
            .service(get_file)
            .service(record_usage)
            .service(add_tags)
            .service(delete_file),
    );
}

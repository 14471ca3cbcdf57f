use actix_web::web::{scope, ServiceConfig};

use crate::modules::workflow::handle::*;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/workflows")
            .service(list_workflows)
            .service(create_workflow)
            .service(get_workflow)
            .service(update_workflow)
            .service(delete_workflow),
    );
}

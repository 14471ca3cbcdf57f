use actix_web::{
    middleware::from_fn,
    web::{scope, ServiceConfig},
};

use crate::{middlewares::authorization, modules::email_security::handle::*, utils::UserRole};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/email-security")
            .wrap(from_fn(authorization(vec![UserRole::Admin])))
            .service(search_messages)
            .service(delete_messages)
            .service(history),
    );
}

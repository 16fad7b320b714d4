pub mod handlers;
pub mod types;

use actix_web::{web, Scope};

pub fn routes() -> Scope {
    web::scope("/subscription")
        .service(handlers::export_subscription)
        .service(handlers::import_subscription)
}

pub mod handlers;
pub mod types;

use actix_web::{web, Scope};

pub fn routes() -> Scope {
    web::scope("/feeds")
        .service(handlers::pull_feeds)
        .service(handlers::add_feed)
        .service(handlers::edit_feeds)
        .service(handlers::list_feeds)
        .service(handlers::delete_feeds)
}

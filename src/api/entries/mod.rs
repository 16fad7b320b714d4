pub mod handlers;
pub mod types;

use actix_web::{web, Scope};

pub fn routes() -> Scope {
    web::scope("/entries")
        .service(handlers::list_entries)
        .service(handlers::edit_entries)
        .service(handlers::get_entry)
}

use super::{entries, feeds, info, stats, subscription};
use actix_web::{web, Scope};

pub fn routes() -> Scope {
    web::scope("/api")
        .service(feeds::routes())
        .service(entries::routes())
        .service(subscription::routes())
        .service(stats::get_stats)
        .service(info::get_info)
}

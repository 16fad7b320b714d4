use actix_web::{get, HttpResponse, Responder};
use serde_json::json;

/// Build metadata for clients that want to display what they talk to.
#[get("/info")]
pub async fn get_info() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "description": env!("CARGO_PKG_DESCRIPTION")
    }))
}

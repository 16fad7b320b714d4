use crate::server::ServingState;
use crate::RqStore;
use actix_web::{get, web, HttpResponse, Responder};
use serde_json::json;

/// Health check endpoint. Reports NOT_SERVING until the listener is up,
/// then SERVING as long as the database answers.
#[get("")]
pub async fn health_check(state: web::Data<ServingState>, store: RqStore) -> impl Responder {
    if !state.is_serving() {
        return HttpResponse::ServiceUnavailable().json(json!({
            "status": "NOT_SERVING"
        }));
    }
    if store.ping() {
        HttpResponse::Ok().json(json!({
            "status": "SERVING",
            "database": "connected"
        }))
    } else {
        HttpResponse::ServiceUnavailable().json(json!({
            "status": "NOT_SERVING",
            "database": "disconnected"
        }))
    }
}

/// Readiness check - database connectivity only
#[get("/ready")]
pub async fn readiness_check(store: RqStore) -> impl Responder {
    if store.ping() {
        HttpResponse::Ok().json(json!({
            "status": "ready",
            "database": "connected"
        }))
    } else {
        HttpResponse::ServiceUnavailable().json(json!({
            "status": "not_ready",
            "database": "disconnected"
        }))
    }
}

/// Liveness check - simple check to see if the app is alive
#[get("/live")]
pub async fn liveness_check() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub fn routes() -> actix_web::Scope {
    web::scope("/health")
        .service(health_check)
        .service(readiness_check)
        .service(liveness_check)
}

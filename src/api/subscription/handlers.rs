use super::types::{ExportQuery, ImportResponse};
use crate::errors::AppResult;
use crate::models::subscription::Subscription;
use crate::RqStore;
use actix_web::{get, post, web, HttpResponse};

/// Emits the current feed set as a subscription document; the OPML text
/// round-trip happens client-side.
#[get("")]
pub async fn export_subscription(
    store: RqStore,
    query: web::Query<ExportQuery>,
) -> AppResult<HttpResponse> {
    let sub = store
        .export_subscription(query.into_inner().title)
        .await?;
    Ok(HttpResponse::Ok().json(sub))
}

#[post("")]
pub async fn import_subscription(
    store: RqStore,
    sub: web::Json<Subscription>,
) -> AppResult<HttpResponse> {
    let (processed, imported) = store.import_subscription(sub.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ImportResponse {
        processed,
        imported,
    }))
}

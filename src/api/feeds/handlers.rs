use super::types::{AddFeedResponse, DeleteFeedsRequest, EditFeedsRequest, ListFeedsQuery};
use crate::errors::{AppError, AppResult};
use crate::store::{AddFeedRequest, CancelGuard, PullFeedsRequest};
use crate::RqStore;
use actix_web::web::Bytes;
use actix_web::{delete, get, patch, post, web, HttpResponse};
use futures_util::stream;

#[post("")]
pub async fn add_feed(store: RqStore, req: web::Json<AddFeedRequest>) -> AppResult<HttpResponse> {
    let req = req.into_inner();
    if req.url.trim().is_empty() {
        return Err(AppError::invalid_argument("feed url cannot be empty"));
    }
    let (feed, added) = store.add_feed(req).await?;
    Ok(HttpResponse::Ok().json(AddFeedResponse { feed, added }))
}

#[patch("")]
pub async fn edit_feeds(store: RqStore, req: web::Json<EditFeedsRequest>) -> AppResult<HttpResponse> {
    let feeds = store.edit_feeds(req.into_inner().feeds).await?;
    Ok(HttpResponse::Ok().json(feeds))
}

#[get("")]
pub async fn list_feeds(store: RqStore, query: web::Query<ListFeedsQuery>) -> AppResult<HttpResponse> {
    let feeds = store.list_feeds(query.with_entries).await?;
    Ok(HttpResponse::Ok().json(feeds))
}

#[delete("")]
pub async fn delete_feeds(
    store: RqStore,
    req: web::Json<DeleteFeedsRequest>,
) -> AppResult<HttpResponse> {
    store.delete_feeds(req.into_inner().ids).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Server-streaming pull: one NDJSON frame per feed, in completion order.
/// Dropping the response stream cancels the in-flight pull.
#[post("/pull")]
pub async fn pull_feeds(
    store: RqStore,
    req: web::Json<PullFeedsRequest>,
) -> AppResult<HttpResponse> {
    let (guard, cancel) = CancelGuard::new();
    let results = store.pull_feeds(req.into_inner(), cancel).await;
    let frames = stream::unfold((results, guard), |(mut results, guard)| async move {
        let result = results.recv().await?;
        let mut line = serde_json::to_vec(&result)
            .unwrap_or_else(|_| br#"{"error":"internal error: result serialization failed"}"#.to_vec());
        line.push(b'\n');
        Some((Ok::<_, actix_web::Error>(Bytes::from(line)), (results, guard)))
    });
    Ok(HttpResponse::Ok()
        .content_type("application/x-ndjson")
        .streaming(frames))
}

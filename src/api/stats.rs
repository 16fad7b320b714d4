use crate::errors::AppResult;
use crate::RqStore;
use actix_web::{get, HttpResponse};

#[get("/stats")]
pub async fn get_stats(store: RqStore) -> AppResult<HttpResponse> {
    let stats = store.global_stats().await?;
    Ok(HttpResponse::Ok().json(stats))
}

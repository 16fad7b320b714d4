use super::types::{EditEntriesRequest, ListEntriesQuery, RqEntryId};
use crate::errors::{AppError, AppResult};
use crate::RqStore;
use actix_web::{get, patch, web, HttpResponse};

#[get("")]
pub async fn list_entries(
    store: RqStore,
    query: web::Query<ListEntriesQuery>,
) -> AppResult<HttpResponse> {
    let feed_ids = match &query.feed_ids {
        None => None,
        Some(raw) => {
            let mut ids = Vec::new();
            for part in raw.split(',').filter(|p| !p.trim().is_empty()) {
                let id = part.trim().parse::<i32>().map_err(|_| {
                    AppError::invalid_argument(format!("invalid feed id '{}'", part.trim()))
                })?;
                ids.push(id);
            }
            if ids.is_empty() {
                None
            } else {
                Some(ids)
            }
        }
    };
    let entries = store.list_entries(feed_ids, query.bookmarked).await?;
    Ok(HttpResponse::Ok().json(entries))
}

#[patch("")]
pub async fn edit_entries(
    store: RqStore,
    req: web::Json<EditEntriesRequest>,
) -> AppResult<HttpResponse> {
    let entries = store.edit_entries(req.into_inner().entries).await?;
    Ok(HttpResponse::Ok().json(entries))
}

#[get("/{entry_id}")]
pub async fn get_entry(store: RqStore, path: RqEntryId) -> AppResult<HttpResponse> {
    let entry_id = path
        .entry_id
        .parse::<i32>()
        .map_err(|_| AppError::invalid_argument(format!("invalid entry id '{}'", path.entry_id)))?;
    let entry = store.get_entry(entry_id).await?;
    Ok(HttpResponse::Ok().json(entry))
}

use crate::store::EntryEditOp;
use actix_web::web;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ListEntriesQuery {
    /// Comma-separated feed ids; absent means all feeds.
    pub feed_ids: Option<String>,
    pub bookmarked: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct EditEntriesRequest {
    pub entries: Vec<EntryEditOp>,
}

#[derive(Debug, Deserialize)]
pub struct EntryPath {
    pub entry_id: String,
}

pub type RqEntryId = web::Path<EntryPath>;

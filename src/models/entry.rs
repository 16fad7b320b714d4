use crate::models::feed::FeedRow;
use crate::schema::*;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// One article of a feed. The row and the wire shape are the same here;
/// `ext_id` is the feed-provided identifier, unique within its feed.
#[derive(
    Debug, Clone, Serialize, Deserialize, Queryable, Identifiable, Associations, PartialEq,
)]
#[diesel(belongs_to(FeedRow, foreign_key = feed_id))]
#[diesel(table_name = entries)]
pub struct Entry {
    pub id: i32,
    pub feed_id: i32,
    pub ext_id: String,
    pub title: String,
    pub url: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub published_at: Option<i64>,
    pub updated_at: Option<i64>,
    pub is_read: bool,
    pub is_bookmarked: bool,
}

#[derive(Debug, Default, Insertable)]
#[diesel(table_name = entries)]
pub struct NewEntry<'a> {
    pub feed_id: i32,
    pub ext_id: &'a str,
    pub title: &'a str,
    pub url: Option<&'a str>,
    pub description: Option<&'a str>,
    pub content: Option<&'a str>,
    pub published_at: Option<i64>,
    pub updated_at: Option<i64>,
    pub is_read: bool,
}

/// Refresh of an existing entry during upsert. Optional fields are only
/// written when the incoming item carries them; `is_read` is always
/// recomputed by the caller.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = entries)]
pub struct EntryUpsert<'a> {
    pub title: &'a str,
    pub url: Option<&'a str>,
    pub description: Option<&'a str>,
    pub content: Option<&'a str>,
    pub published_at: Option<i64>,
    pub updated_at: Option<i64>,
    pub is_read: bool,
}

/// User-driven edit; `None` leaves the stored flag alone.
#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = entries)]
pub struct EntryChanges {
    pub is_read: Option<bool>,
    pub is_bookmarked: Option<bool>,
}

impl EntryChanges {
    pub fn is_empty(&self) -> bool {
        self.is_read.is_none() && self.is_bookmarked.is_none()
    }
}

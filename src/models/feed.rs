use crate::models::entry::Entry;
use crate::schema::*;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// One row of the `feeds` table.
#[derive(Debug, Clone, Queryable, Identifiable, PartialEq)]
#[diesel(table_name = feeds)]
pub struct FeedRow {
    pub id: i32,
    pub feed_url: String,
    pub title: String,
    pub description: Option<String>,
    pub site_url: Option<String>,
    pub is_starred: bool,
    pub subscribed_at: i64,
    pub last_pulled_at: i64,
    pub updated_at: Option<i64>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = feeds)]
pub struct NewFeed<'a> {
    pub feed_url: &'a str,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub site_url: Option<&'a str>,
    pub is_starred: bool,
    pub subscribed_at: i64,
    pub last_pulled_at: i64,
    pub updated_at: Option<i64>,
}

/// Partial update for a feed row; `None` leaves the stored value alone.
#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = feeds)]
pub struct FeedChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub site_url: Option<String>,
    pub is_starred: Option<bool>,
    pub last_pulled_at: Option<i64>,
}

impl FeedChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.site_url.is_none()
            && self.is_starred.is_none()
            && self.last_pulled_at.is_none()
    }
}

/// A feed as callers see it: the row plus its tag set and (optionally)
/// its entries. Value copy; mutating it does not touch persisted state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Feed {
    pub id: i32,
    pub feed_url: String,
    pub title: String,
    pub description: Option<String>,
    pub site_url: Option<String>,
    pub is_starred: bool,
    pub tags: Vec<String>,
    pub subscribed_at: i64,
    pub last_pulled_at: i64,
    pub updated_at: Option<i64>,
    #[serde(default)]
    pub entries: Vec<Entry>,
}

impl Feed {
    pub fn from_row(row: FeedRow, tags: Vec<String>, entries: Vec<Entry>) -> Self {
        Feed {
            id: row.id,
            feed_url: row.feed_url,
            title: row.title,
            description: row.description,
            site_url: row.site_url,
            is_starred: row.is_starred,
            tags,
            subscribed_at: row.subscribed_at,
            last_pulled_at: row.last_pulled_at,
            updated_at: row.updated_at,
            entries,
        }
    }
}

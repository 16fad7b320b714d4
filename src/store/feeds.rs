use super::{entries, Store};
use crate::errors::{AppError, AppResult, DbResultExt};
use crate::fetch::ParsedFeed;
use crate::models::feed::{Feed, FeedChanges, FeedRow, NewFeed};
use crate::models::{normalize, normalize_tags};
use crate::schema::{feed_tags, feeds, feeds_x_feed_tags};
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use serde::Deserialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddFeedRequest {
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub is_starred: Option<bool>,
}

/// One edit operation; `None` fields leave the stored value unchanged,
/// `tags` replaces the whole set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedEditOp {
    pub id: i32,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_starred: Option<bool>,
}

impl Store {
    /// Fetches the feed at `url`, upserts it keyed on the resolved feed
    /// URL, and returns the stored feed with its entries. `added` tells
    /// whether a new row was created. User-supplied values win over
    /// parsed ones.
    pub async fn add_feed(&self, req: AddFeedRequest) -> AppResult<(Feed, bool)> {
        let _gate = self.write_gate.write().await;
        let parsed = self.fetcher.fetch(&req.url).await?;
        let mut conn = self.conn()?;
        conn.transaction::<_, AppError, _>(|conn| {
            let (feed_id, added) = upsert_fetched_feed(conn, &req, &parsed)?;
            entries::upsert_parsed_entries(conn, feed_id, &parsed.entries)?;
            add_tag_links(conn, feed_id, &normalize_tags(req.tags.clone()))?;
            let row = feeds::table
                .find(feed_id)
                .first::<FeedRow>(conn)
                .op("add_feed: reload feed")?;
            let feed = load_feed(conn, row, true)?;
            Ok((feed, added))
        })
    }

    /// Applies each edit in order and returns the resulting feeds in the
    /// same order. Fails the whole batch on the first unknown id.
    pub async fn edit_feeds(&self, ops: Vec<FeedEditOp>) -> AppResult<Vec<Feed>> {
        let _gate = self.write_gate.write().await;
        let mut conn = self.conn()?;
        conn.transaction::<_, AppError, _>(|conn| {
            let mut out = Vec::with_capacity(ops.len());
            for op in &ops {
                feeds::table
                    .find(op.id)
                    .first::<FeedRow>(conn)
                    .optional()
                    .op("edit_feeds: lookup feed")?
                    .ok_or(AppError::FeedNotFound(op.id))?;

                let changes = FeedChanges {
                    title: normalize(op.title.clone()),
                    description: normalize(op.description.clone()),
                    is_starred: op.is_starred,
                    ..Default::default()
                };
                if !changes.is_empty() {
                    diesel::update(feeds::table.find(op.id))
                        .set(&changes)
                        .execute(conn)
                        .op("edit_feeds: update feed")?;
                }
                if let Some(tags) = &op.tags {
                    set_tag_links(conn, op.id, &normalize_tags(tags.clone()))?;
                }

                let row = feeds::table
                    .find(op.id)
                    .first::<FeedRow>(conn)
                    .op("edit_feeds: reload feed")?;
                out.push(load_feed(conn, row, false)?);
            }
            Ok(out)
        })
    }

    /// All feeds, most recently updated first (subscription time when a
    /// feed was never updated). Entries are included only when asked for.
    pub async fn list_feeds(&self, with_entries: bool) -> AppResult<Vec<Feed>> {
        let _gate = self.write_gate.read().await;
        let mut conn = self.conn()?;
        let rows = feeds::table
            .order(sql::<BigInt>("COALESCE(updated_at, subscribed_at) DESC, id ASC"))
            .load::<FeedRow>(&mut conn)
            .op("list_feeds: query")?;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(load_feed(&mut conn, row, with_entries)?);
        }
        Ok(out)
    }

    /// Deletes the given feeds (duplicates collapse to one delete). Every
    /// distinct id must exist or the whole batch rolls back.
    pub async fn delete_feeds(&self, ids: Vec<i32>) -> AppResult<()> {
        let _gate = self.write_gate.write().await;
        let mut conn = self.conn()?;
        let mut seen = HashSet::new();
        let ids: Vec<i32> = ids.into_iter().filter(|id| seen.insert(*id)).collect();
        conn.transaction::<_, AppError, _>(|conn| {
            for id in &ids {
                let n = diesel::delete(feeds::table.find(id))
                    .execute(conn)
                    .op("delete_feeds: delete feed")?;
                if n != 1 {
                    return Err(AppError::FeedNotFound(*id));
                }
            }
            gc_tags(conn)?;
            Ok(())
        })
    }
}

/// Insert-or-update of a feed row from a fetched document. Precedence per
/// field: user value > parsed value > existing value.
fn upsert_fetched_feed(
    conn: &mut SqliteConnection,
    req: &AddFeedRequest,
    parsed: &ParsedFeed,
) -> AppResult<(i32, bool)> {
    let now = chrono::Utc::now().timestamp();
    let feed_url = if parsed.feed_url.trim().is_empty() {
        req.url.as_str()
    } else {
        parsed.feed_url.as_str()
    };
    let user_title = normalize(req.title.clone());
    let user_description = normalize(req.description.clone());
    let parsed_title = normalize(Some(parsed.title.clone()));
    let updated_at = parsed.effective_updated();

    let existing = feeds::table
        .filter(feeds::feed_url.eq(feed_url))
        .first::<FeedRow>(conn)
        .optional()
        .op("add_feed: lookup by url")?;

    match existing {
        Some(row) => {
            let changes = FeedChanges {
                title: user_title.or(parsed_title),
                description: user_description.or_else(|| parsed.description.clone()),
                site_url: parsed.site_url.clone(),
                is_starred: req.is_starred,
                last_pulled_at: Some(now),
            };
            diesel::update(feeds::table.find(row.id))
                .set((&changes, feeds::updated_at.eq(updated_at)))
                .execute(conn)
                .op("add_feed: update feed")?;
            Ok((row.id, false))
        }
        None => {
            let title = user_title
                .or(parsed_title)
                .unwrap_or_else(|| feed_url.to_string());
            let description = user_description.or_else(|| parsed.description.clone());
            let new_feed = NewFeed {
                feed_url,
                title: &title,
                description: description.as_deref(),
                site_url: parsed.site_url.as_deref(),
                is_starred: req.is_starred.unwrap_or(false),
                subscribed_at: now,
                last_pulled_at: now,
                updated_at,
            };
            let row: FeedRow = diesel::insert_into(feeds::table)
                .values(&new_feed)
                .get_result(conn)
                .op("add_feed: insert feed")?;
            Ok((row.id, true))
        }
    }
}

pub(crate) fn tags_for(conn: &mut SqliteConnection, feed_id: i32) -> AppResult<Vec<String>> {
    feeds_x_feed_tags::table
        .inner_join(feed_tags::table)
        .filter(feeds_x_feed_tags::feed_id.eq(feed_id))
        .select(feed_tags::name)
        .order(feed_tags::name.asc())
        .load::<String>(conn)
        .op("load feed tags")
}

/// Assembles the caller-facing feed from its row, tag set, and entries.
pub(crate) fn load_feed(
    conn: &mut SqliteConnection,
    row: FeedRow,
    with_entries: bool,
) -> AppResult<Feed> {
    let tags = tags_for(conn, row.id)?;
    let entries = if with_entries {
        entries::entries_for_feed(conn, row.id)?
    } else {
        Vec::new()
    };
    Ok(Feed::from_row(row, tags, entries))
}

/// Links the given tags to a feed, creating tag rows as needed. Existing
/// links are kept.
pub(crate) fn add_tag_links(
    conn: &mut SqliteConnection,
    feed_id: i32,
    tags: &[String],
) -> AppResult<()> {
    if tags.is_empty() {
        return Ok(());
    }
    for tag in tags {
        diesel::insert_or_ignore_into(feed_tags::table)
            .values(feed_tags::name.eq(tag))
            .execute(conn)
            .op("add tag")?;
    }
    let tag_ids = feed_tags::table
        .filter(feed_tags::name.eq_any(tags))
        .select(feed_tags::id)
        .load::<i32>(conn)
        .op("lookup tag ids")?;
    for tag_id in tag_ids {
        diesel::insert_or_ignore_into(feeds_x_feed_tags::table)
            .values((
                feeds_x_feed_tags::feed_id.eq(feed_id),
                feeds_x_feed_tags::feed_tag_id.eq(tag_id),
            ))
            .execute(conn)
            .op("link tag")?;
    }
    Ok(())
}

/// Replaces a feed's tag set and collects orphans.
pub(crate) fn set_tag_links(
    conn: &mut SqliteConnection,
    feed_id: i32,
    tags: &[String],
) -> AppResult<()> {
    diesel::delete(feeds_x_feed_tags::table.filter(feeds_x_feed_tags::feed_id.eq(feed_id)))
        .execute(conn)
        .op("clear tag links")?;
    add_tag_links(conn, feed_id, tags)?;
    gc_tags(conn)
}

/// Drops tag rows no feed links to anymore.
pub(crate) fn gc_tags(conn: &mut SqliteConnection) -> AppResult<()> {
    let live = feeds_x_feed_tags::table.select(feeds_x_feed_tags::feed_tag_id);
    diesel::delete(feed_tags::table.filter(feed_tags::id.ne_all(live)))
        .execute(conn)
        .op("gc tags")?;
    Ok(())
}

use super::{feeds as feed_store, Store};
use crate::errors::{AppError, AppResult, DbResultExt};
use crate::models::feed::{FeedRow, NewFeed};
use crate::models::normalize;
use crate::models::subscription::{Subscription, SubscriptionFeed};
use crate::schema::feeds;
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::BigInt;

impl Store {
    /// Snapshot of all feeds (without entries) as a subscription document,
    /// ordered as in list_feeds.
    pub async fn export_subscription(&self, title: Option<String>) -> AppResult<Subscription> {
        let _gate = self.write_gate.read().await;
        let mut conn = self.conn()?;
        let rows = feeds::table
            .order(sql::<BigInt>("COALESCE(updated_at, subscribed_at) DESC, id ASC"))
            .load::<FeedRow>(&mut conn)
            .op("export_subscription: query")?;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let tags = feed_store::tags_for(&mut conn, row.id)?;
            out.push(SubscriptionFeed {
                feed_url: row.feed_url,
                title: row.title,
                description: row.description,
                tags,
                is_starred: row.is_starred,
            });
        }
        Ok(Subscription {
            title: normalize(title),
            feeds: out,
        })
    }

    /// Upserts every feed of the document keyed on `feed_url`, without
    /// fetching. Returns `(processed, imported)`: all feeds count as
    /// processed, only newly created rows as imported. An empty document
    /// is a no-op.
    pub async fn import_subscription(&self, mut sub: Subscription) -> AppResult<(usize, usize)> {
        sub.validate()?;
        if sub.feeds.is_empty() {
            return Ok((0, 0));
        }
        let _gate = self.write_gate.write().await;
        let mut conn = self.conn()?;
        conn.transaction::<_, AppError, _>(|conn| {
            let now = chrono::Utc::now().timestamp();
            let mut processed = 0usize;
            let mut imported = 0usize;
            for feed in &sub.feeds {
                processed += 1;
                let existing = feeds::table
                    .filter(feeds::feed_url.eq(&feed.feed_url))
                    .first::<FeedRow>(conn)
                    .optional()
                    .op("import_subscription: lookup feed")?;
                let feed_id = match existing {
                    Some(row) => {
                        diesel::update(feeds::table.find(row.id))
                            .set((
                                feeds::title.eq(&feed.title),
                                feeds::description.eq(feed.description.clone()),
                                feeds::is_starred.eq(feed.is_starred),
                            ))
                            .execute(conn)
                            .op("import_subscription: update feed")?;
                        row.id
                    }
                    None => {
                        imported += 1;
                        let new_feed = NewFeed {
                            feed_url: &feed.feed_url,
                            title: &feed.title,
                            description: feed.description.as_deref(),
                            site_url: None,
                            is_starred: feed.is_starred,
                            subscribed_at: now,
                            last_pulled_at: now,
                            updated_at: None,
                        };
                        let row: FeedRow = diesel::insert_into(feeds::table)
                            .values(&new_feed)
                            .get_result(conn)
                            .op("import_subscription: insert feed")?;
                        row.id
                    }
                };
                feed_store::add_tag_links(conn, feed_id, &feed.tags)?;
            }
            Ok((processed, imported))
        })
    }
}

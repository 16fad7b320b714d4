use super::Store;
use crate::errors::{AppError, AppResult, DbResultExt};
use crate::fetch::ParsedEntry;
use crate::models::entry::{Entry, EntryChanges, EntryUpsert, NewEntry};
use crate::schema::entries;
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use serde::Deserialize;

/// One edit operation; `None` fields leave the stored flag unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryEditOp {
    pub id: i32,
    pub is_read: Option<bool>,
    pub is_bookmarked: Option<bool>,
}

impl Store {
    /// Entries across feeds, newest first. Absent filters mean "any".
    pub async fn list_entries(
        &self,
        feed_ids: Option<Vec<i32>>,
        is_bookmarked: Option<bool>,
    ) -> AppResult<Vec<Entry>> {
        let _gate = self.write_gate.read().await;
        let mut conn = self.conn()?;
        let mut query = entries::table.into_boxed();
        if let Some(ids) = feed_ids {
            if !ids.is_empty() {
                query = query.filter(entries::feed_id.eq_any(ids));
            }
        }
        if let Some(flag) = is_bookmarked {
            query = query.filter(entries::is_bookmarked.eq(flag));
        }
        query
            .order(sql::<BigInt>("COALESCE(updated_at, published_at) DESC, id ASC"))
            .load::<Entry>(&mut conn)
            .op("list_entries: query")
    }

    /// Applies each edit in order and returns the resulting entries in
    /// the same order. Fails the whole batch on the first unknown id.
    pub async fn edit_entries(&self, ops: Vec<EntryEditOp>) -> AppResult<Vec<Entry>> {
        let _gate = self.write_gate.write().await;
        let mut conn = self.conn()?;
        conn.transaction::<_, AppError, _>(|conn| {
            let mut out = Vec::with_capacity(ops.len());
            for op in &ops {
                entries::table
                    .find(op.id)
                    .first::<Entry>(conn)
                    .optional()
                    .op("edit_entries: lookup entry")?
                    .ok_or(AppError::EntryNotFound(op.id))?;

                let changes = EntryChanges {
                    is_read: op.is_read,
                    is_bookmarked: op.is_bookmarked,
                };
                if !changes.is_empty() {
                    diesel::update(entries::table.find(op.id))
                        .set(&changes)
                        .execute(conn)
                        .op("edit_entries: update entry")?;
                }

                let entry = entries::table
                    .find(op.id)
                    .first::<Entry>(conn)
                    .op("edit_entries: reload entry")?;
                out.push(entry);
            }
            Ok(out)
        })
    }

    pub async fn get_entry(&self, id: i32) -> AppResult<Entry> {
        let _gate = self.write_gate.read().await;
        let mut conn = self.conn()?;
        entries::table
            .find(id)
            .first::<Entry>(&mut conn)
            .optional()
            .op("get_entry: query")?
            .ok_or(AppError::EntryNotFound(id))
    }
}

/// A feed's entries, newest first.
pub(crate) fn entries_for_feed(conn: &mut SqliteConnection, feed_id: i32) -> AppResult<Vec<Entry>> {
    entries::table
        .filter(entries::feed_id.eq(feed_id))
        .order(sql::<BigInt>("COALESCE(updated_at, published_at) DESC, id ASC"))
        .load::<Entry>(conn)
        .op("load feed entries")
}

/// Insert-or-update of incoming items keyed on `(feed_id, ext_id)`, used
/// by both the add and pull paths. An update whose `updated_at` advanced
/// resets the entry to unread; an unchanged one keeps the read flag.
pub(crate) fn upsert_parsed_entries(
    conn: &mut SqliteConnection,
    feed_id: i32,
    items: &[ParsedEntry],
) -> AppResult<usize> {
    for item in items {
        let updated_at = item.effective_updated();
        let published_at = item.effective_published();

        let existing = entries::table
            .filter(entries::feed_id.eq(feed_id))
            .filter(entries::ext_id.eq(&item.ext_id))
            .first::<Entry>(conn)
            .optional()
            .op("upsert entries: lookup")?;

        match existing {
            None => {
                let new_entry = NewEntry {
                    feed_id,
                    ext_id: &item.ext_id,
                    title: &item.title,
                    url: item.url.as_deref(),
                    description: item.description.as_deref(),
                    content: item.content.as_deref(),
                    published_at,
                    updated_at,
                    is_read: false,
                };
                diesel::insert_into(entries::table)
                    .values(&new_entry)
                    .execute(conn)
                    .op("upsert entries: insert")?;
            }
            Some(stored) => {
                let is_read = if stored.updated_at == updated_at {
                    stored.is_read
                } else {
                    false
                };
                let refresh = EntryUpsert {
                    title: &item.title,
                    url: item.url.as_deref(),
                    description: item.description.as_deref(),
                    content: item.content.as_deref(),
                    published_at,
                    updated_at,
                    is_read,
                };
                diesel::update(entries::table.find(stored.id))
                    .set(&refresh)
                    .execute(conn)
                    .op("upsert entries: update")?;
            }
        }
    }
    Ok(items.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::feed::NewFeed;
    use crate::schema::feeds;
    use crate::test_helpers::get_test_db_connection;

    fn seed_feed(conn: &mut SqliteConnection) -> i32 {
        let feed = NewFeed {
            feed_url: "https://x.test/feed.xml",
            title: "x",
            description: None,
            site_url: None,
            is_starred: false,
            subscribed_at: 100,
            last_pulled_at: 100,
            updated_at: None,
        };
        diesel::insert_into(feeds::table)
            .values(&feed)
            .get_result::<crate::models::feed::FeedRow>(conn)
            .unwrap()
            .id
    }

    fn item(ext_id: &str, updated_at: Option<i64>) -> ParsedEntry {
        ParsedEntry {
            ext_id: ext_id.into(),
            title: format!("title-{ext_id}"),
            updated_at,
            ..Default::default()
        }
    }

    fn get(conn: &mut SqliteConnection, feed_id: i32, ext_id: &str) -> Entry {
        entries::table
            .filter(entries::feed_id.eq(feed_id))
            .filter(entries::ext_id.eq(ext_id))
            .first::<Entry>(conn)
            .unwrap()
    }

    #[test]
    fn test_insert_then_update_keeps_identity() {
        let mut conn = get_test_db_connection();
        let feed_id = seed_feed(&mut conn);

        upsert_parsed_entries(&mut conn, feed_id, &[item("a", Some(10))]).unwrap();
        let first = get(&mut conn, feed_id, "a");
        assert!(!first.is_read);

        upsert_parsed_entries(&mut conn, feed_id, &[item("a", Some(10))]).unwrap();
        let second = get(&mut conn, feed_id, "a");
        assert_eq!(first.id, second.id);
    }

    #[test]
    fn test_unchanged_update_time_preserves_read_flag() {
        let mut conn = get_test_db_connection();
        let feed_id = seed_feed(&mut conn);
        upsert_parsed_entries(&mut conn, feed_id, &[item("a", Some(10))]).unwrap();

        let stored = get(&mut conn, feed_id, "a");
        diesel::update(entries::table.find(stored.id))
            .set(entries::is_read.eq(true))
            .execute(&mut conn)
            .unwrap();

        upsert_parsed_entries(&mut conn, feed_id, &[item("a", Some(10))]).unwrap();
        assert!(get(&mut conn, feed_id, "a").is_read);
    }

    #[test]
    fn test_advanced_update_time_resets_read_flag() {
        let mut conn = get_test_db_connection();
        let feed_id = seed_feed(&mut conn);
        upsert_parsed_entries(&mut conn, feed_id, &[item("a", Some(10))]).unwrap();

        let stored = get(&mut conn, feed_id, "a");
        diesel::update(entries::table.find(stored.id))
            .set(entries::is_read.eq(true))
            .execute(&mut conn)
            .unwrap();

        upsert_parsed_entries(&mut conn, feed_id, &[item("a", Some(20))]).unwrap();
        let refreshed = get(&mut conn, feed_id, "a");
        assert!(!refreshed.is_read);
        assert_eq!(refreshed.updated_at, Some(20));
    }

    #[test]
    fn test_missing_published_taken_from_updated() {
        let mut conn = get_test_db_connection();
        let feed_id = seed_feed(&mut conn);
        upsert_parsed_entries(&mut conn, feed_id, &[item("a", Some(30))]).unwrap();
        let stored = get(&mut conn, feed_id, "a");
        assert_eq!(stored.published_at, Some(30));
        assert_eq!(stored.updated_at, Some(30));
    }
}

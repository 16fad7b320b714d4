use super::Store;
use crate::errors::{AppResult, DbResultExt};
use crate::models::stats::Stats;
use crate::schema::{entries, feeds};
use diesel::dsl::max;
use diesel::prelude::*;

impl Store {
    /// Aggregate counts across all feeds and entries.
    pub async fn global_stats(&self) -> AppResult<Stats> {
        let _gate = self.write_gate.read().await;
        let mut conn = self.conn()?;
        let num_feeds: i64 = feeds::table
            .count()
            .get_result(&mut conn)
            .op("global_stats: count feeds")?;
        let num_entries: i64 = entries::table
            .count()
            .get_result(&mut conn)
            .op("global_stats: count entries")?;
        let num_entries_unread: i64 = entries::table
            .filter(entries::is_read.eq(false))
            .count()
            .get_result(&mut conn)
            .op("global_stats: count unread")?;
        let last_pull_time: Option<i64> = feeds::table
            .select(max(feeds::last_pulled_at))
            .first(&mut conn)
            .op("global_stats: last pull time")?;
        let most_recent_update_time: Option<i64> = feeds::table
            .select(max(feeds::updated_at))
            .first(&mut conn)
            .op("global_stats: most recent update")?;
        Ok(Stats {
            num_feeds,
            num_entries,
            num_entries_unread,
            last_pull_time,
            most_recent_update_time,
        })
    }
}

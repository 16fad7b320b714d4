use serde::{Deserialize, Serialize};

/// Aggregate snapshot across all feeds and entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Stats {
    pub num_feeds: i64,
    pub num_entries: i64,
    pub num_entries_unread: i64,
    pub last_pull_time: Option<i64>,
    pub most_recent_update_time: Option<i64>,
}

use super::{entries as entry_store, feeds as feed_store, Store, Txn};
use crate::errors::{AppError, AppResult, DbResultExt};
use crate::fetch::ParsedFeed;
use crate::models::entry::Entry;
use crate::models::feed::{Feed, FeedRow};
use crate::schema::{entries, feeds};
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PullFeedsRequest {
    /// Feeds to pull; empty means all.
    #[serde(default)]
    pub feed_ids: Vec<i32>,
    /// When set, only entries whose read flag matches are returned.
    pub only_entries_with_read_status: Option<bool>,
    /// Caps the entries returned per feed; 0 returns feed metadata only.
    pub max_entries_per_feed: Option<u32>,
}

/// Per-feed outcome envelope carried on the pull stream. The `url` is the
/// feed being pulled; errors that originate outside any particular feed
/// (transaction begin/commit, id lookup) carry no URL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PullResult {
    // Failed must come first: untagged deserialization tries variants in
    // order, and a frame with an `error` field would otherwise match
    // Pulled with its absent `feed` defaulting to None.
    Failed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
        error: String,
    },
    Pulled {
        url: String,
        /// `None` means "pulled, nothing new to report".
        feed: Option<Box<Feed>>,
    },
}

impl PullResult {
    fn pulled(url: &str, feed: Option<Feed>) -> Self {
        PullResult::Pulled {
            url: url.to_string(),
            feed: feed.map(Box::new),
        }
    }

    fn failed(url: Option<&str>, err: &AppError) -> Self {
        PullResult::Failed {
            url: url.map(str::to_string),
            error: err.to_string(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, PullResult::Failed { .. })
    }
}

/// Cancels its token when dropped, tying a pull's lifetime to whatever
/// consumes the stream.
pub struct CancelGuard(watch::Sender<bool>);

impl CancelGuard {
    pub fn new() -> (CancelGuard, watch::Receiver<bool>) {
        let (tx, rx) = watch::channel(false);
        (CancelGuard(tx), rx)
    }

    pub fn cancel(&self) {
        let _ = self.0.send(true);
    }
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        let _ = self.0.send(true);
    }
}

/// Resolves once the token observes a cancel. Never resolves if the
/// sender goes away without cancelling first.
async fn cancelled(mut token: watch::Receiver<bool>) {
    loop {
        if *token.borrow_and_update() {
            return;
        }
        if token.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

impl Store {
    /// Concurrently fetches and reconciles the requested feeds, streaming
    /// one result per feed in completion order. The writer gate and a
    /// single transaction are held until all workers finish; the stream
    /// closes once the last result (or a final transaction error) is out.
    pub async fn pull_feeds(
        &self,
        req: PullFeedsRequest,
        cancel: watch::Receiver<bool>,
    ) -> mpsc::Receiver<PullResult> {
        let gate = Arc::clone(&self.write_gate).write_owned().await;

        let setup = self.conn().and_then(Txn::begin).and_then(|mut txn| {
            let set = resolve_pull_set(txn.conn(), &req.feed_ids)?;
            Ok((txn, set))
        });
        let (mut txn, pull_set) = match setup {
            Ok(resolved) => resolved,
            Err(err) => {
                let (tx, rx) = mpsc::channel(1);
                let _ = tx.try_send(PullResult::failed(None, &err));
                drop(gate);
                return rx;
            }
        };

        let n = pull_set.len();
        let (tx, rx) = mpsc::channel(n.max(1));
        if n == 0 {
            if let Err(err) = txn.commit() {
                let _ = tx.try_send(PullResult::failed(None, &err));
            }
            drop(gate);
            return rx;
        }

        let (fetch_tx, mut fetch_rx) = mpsc::channel(n);
        for (feed_id, url) in pull_set {
            let fetcher = Arc::clone(&self.fetcher);
            let token = cancel.clone();
            let fetch_tx = fetch_tx.clone();
            tokio::spawn(async move {
                let outcome = tokio::select! {
                    _ = cancelled(token) => Err(AppError::Cancelled),
                    fetched = fetcher.fetch(&url) => fetched.map_err(AppError::from),
                };
                let _ = fetch_tx.send((feed_id, url, outcome)).await;
            });
        }
        drop(fetch_tx);

        let mut cancel = cancel;
        tokio::spawn(async move {
            let _gate = gate;
            while let Some((feed_id, url, outcome)) = fetch_rx.recv().await {
                let frame = match outcome {
                    Err(err) => PullResult::failed(Some(&url), &err),
                    Ok(parsed) => {
                        if *cancel.borrow_and_update() {
                            PullResult::failed(Some(&url), &AppError::Cancelled)
                        } else {
                            match reconcile_feed(txn.conn(), feed_id, &parsed, &req) {
                                Ok(feed) => PullResult::pulled(&url, feed),
                                Err(err) => {
                                    log::warn!("Pull writeback failed for {url}: {err}");
                                    PullResult::failed(Some(&url), &err)
                                }
                            }
                        }
                    }
                };
                if tx.send(frame).await.is_err() {
                    // consumer went away; abandon the whole pull
                    let _ = txn.rollback();
                    return;
                }
            }
            if let Err(err) = txn.commit() {
                let _ = tx.send(PullResult::failed(None, &err)).await;
            }
        });
        rx
    }
}

/// The `(id, url)` pairs to pull: all feeds when no ids are given,
/// otherwise each deduplicated id looked up individually. An unknown id
/// fails the resolution outright.
fn resolve_pull_set(conn: &mut SqliteConnection, ids: &[i32]) -> AppResult<Vec<(i32, String)>> {
    if ids.is_empty() {
        return feeds::table
            .select((feeds::id, feeds::feed_url))
            .load::<(i32, String)>(conn)
            .op("pull_feeds: list feeds");
    }
    let mut seen = HashSet::new();
    let mut set = Vec::new();
    for id in ids {
        if !seen.insert(*id) {
            continue;
        }
        let pair = feeds::table
            .find(id)
            .select((feeds::id, feeds::feed_url))
            .first::<(i32, String)>(conn)
            .optional()
            .op("pull_feeds: lookup feed")?;
        match pair {
            Some(pair) => set.push(pair),
            None => return Err(AppError::FeedNotFound(*id)),
        }
    }
    Ok(set)
}

/// Writeback for one fetched feed: stamp pull/update times, upsert the
/// items, and decide what the result frame carries. `Ok(None)` means the
/// pull had nothing interesting to report.
fn reconcile_feed(
    conn: &mut SqliteConnection,
    feed_id: i32,
    parsed: &ParsedFeed,
    req: &PullFeedsRequest,
) -> AppResult<Option<Feed>> {
    let now = chrono::Utc::now().timestamp();
    let updated_at = parsed.effective_updated();
    diesel::update(feeds::table.find(feed_id))
        .set((feeds::last_pulled_at.eq(now), feeds::updated_at.eq(updated_at)))
        .execute(conn)
        .op("pull_feeds: update feed")?;

    if parsed.entries.is_empty() {
        return Ok(None);
    }
    entry_store::upsert_parsed_entries(conn, feed_id, &parsed.entries)?;

    let matched = match req.max_entries_per_feed {
        Some(0) => Vec::new(),
        limit => {
            let mut query = entries::table
                .filter(entries::feed_id.eq(feed_id))
                .into_boxed();
            if let Some(is_read) = req.only_entries_with_read_status {
                query = query.filter(entries::is_read.eq(is_read));
            }
            query = query.order(sql::<BigInt>("COALESCE(updated_at, published_at) DESC, id ASC"));
            if let Some(limit) = limit {
                query = query.limit(i64::from(limit));
            }
            query
                .load::<Entry>(conn)
                .op("pull_feeds: query entries")?
        }
    };

    if matched.is_empty() && req.max_entries_per_feed.is_none() {
        return Ok(None);
    }

    let row = feeds::table
        .find(feed_id)
        .first::<FeedRow>(conn)
        .op("pull_feeds: reload feed")?;
    let tags = feed_store::tags_for(conn, feed_id)?;
    Ok(Some(Feed::from_row(row, tags, matched)))
}

#![allow(dead_code)]

use diesel_migrations::MigrationHarness;
use futures_util::future::BoxFuture;
use roost::fetch::{FetchError, Fetcher, ParsedEntry, ParsedFeed};
use roost::store::{self, Store, MIGRATIONS};
use roost::DbPool;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// Create a test database with a temporary file
pub fn create_test_pool() -> (TempDir, DbPool) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = temp_dir.path().join("test.db");
    let database_url = db_path.to_string_lossy().to_string();

    let pool = store::init_pool(&database_url).expect("Failed to create pool");

    // Run migrations
    let mut conn = pool.get().expect("Failed to get connection");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run migrations");
    drop(conn);

    (temp_dir, pool)
}

pub fn test_store_with(fetcher: Arc<dyn Fetcher>) -> (TempDir, Store) {
    let (temp_dir, pool) = create_test_pool();
    (temp_dir, Store::new(pool, fetcher))
}

/// Scripted fetcher: URL -> canned document or error.
#[derive(Default)]
pub struct StubFetcher {
    feeds: Mutex<HashMap<String, Result<ParsedFeed, String>>>,
}

impl StubFetcher {
    pub fn new() -> Arc<StubFetcher> {
        Arc::new(StubFetcher::default())
    }

    pub fn set_feed(&self, url: &str, feed: ParsedFeed) {
        self.feeds.lock().unwrap().insert(url.to_string(), Ok(feed));
    }

    pub fn set_error(&self, url: &str, message: &str) {
        self.feeds
            .lock()
            .unwrap()
            .insert(url.to_string(), Err(message.to_string()));
    }
}

impl Fetcher for StubFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<ParsedFeed, FetchError>> {
        let result = self.feeds.lock().unwrap().get(url).cloned();
        Box::pin(async move {
            match result {
                Some(Ok(feed)) => Ok(feed),
                Some(Err(message)) => Err(FetchError::Parse(message)),
                None => Err(FetchError::HttpStatus(404)),
            }
        })
    }
}

/// Fetcher that never completes; pulls against it only finish through
/// cancellation.
pub struct NeverFetcher;

impl Fetcher for NeverFetcher {
    fn fetch<'a>(&'a self, _url: &'a str) -> BoxFuture<'a, Result<ParsedFeed, FetchError>> {
        Box::pin(async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(FetchError::HttpStatus(504))
        })
    }
}

pub fn parsed_feed(feed_url: &str, title: &str, entries: Vec<ParsedEntry>) -> ParsedFeed {
    ParsedFeed {
        feed_url: feed_url.to_string(),
        site_url: None,
        title: title.to_string(),
        description: None,
        updated_at: None,
        entries,
    }
}

pub fn parsed_entry(ext_id: &str, title: &str, updated_at: Option<i64>) -> ParsedEntry {
    ParsedEntry {
        ext_id: ext_id.to_string(),
        title: title.to_string(),
        updated_at,
        ..Default::default()
    }
}

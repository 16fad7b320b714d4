use futures_util::future::BoxFuture;
use std::time::Duration;
use thiserror::Error;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

// See: https://stackoverflow.com/a/7001617/5155484
const ACCEPT_HEADER: &str = "application/rss+xml, application/rdf+xml, application/atom+xml, \
     application/feed+json, application/xml;q=0.9, text/xml;q=0.8";

/// Errors surfaced by a [`Fetcher`]. The storage engine treats these as
/// opaque; only the transport boundary cares about the message.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP status {0}")]
    HttpStatus(u16),
    #[error("parse error: {0}")]
    Parse(String),
}

/// A remote feed document, normalized from whatever grammar the upstream
/// spoke. Empty and whitespace-only fields have already been dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedFeed {
    pub feed_url: String,
    pub site_url: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub updated_at: Option<i64>,
    pub entries: Vec<ParsedEntry>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedEntry {
    pub ext_id: String,
    pub url: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub published_at: Option<i64>,
    pub updated_at: Option<i64>,
}

impl ParsedEntry {
    /// Update time with the publish time as fallback.
    pub fn effective_updated(&self) -> Option<i64> {
        self.updated_at.or(self.published_at)
    }

    /// Publish time with the update time as fallback.
    pub fn effective_published(&self) -> Option<i64> {
        self.published_at.or(self.updated_at)
    }
}

impl ParsedFeed {
    /// The feed's declared update time, falling back to the newest entry.
    pub fn effective_updated(&self) -> Option<i64> {
        self.updated_at
            .or_else(|| self.entries.iter().filter_map(|e| e.effective_updated()).max())
    }
}

/// Fetches and normalizes one remote feed document. Implementations must
/// not keep state between calls; cancellation is by dropping the returned
/// future, so every await inside must be abort-safe.
pub trait Fetcher: Send + Sync {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<ParsedFeed, FetchError>>;
}

/// The production fetcher: HTTP via reqwest, XML via feed-rs.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("roost/", env!("CARGO_PKG_VERSION")))
            .timeout(FETCH_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        HttpFetcher { client }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher for HttpFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<ParsedFeed, FetchError>> {
        Box::pin(async move {
            let response = self
                .client
                .get(url)
                .header("Accept", ACCEPT_HEADER)
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(FetchError::HttpStatus(response.status().as_u16()));
            }

            let body = response.bytes().await?;
            let parsed = feed_rs::parser::parse(&body[..])
                .map_err(|e| FetchError::Parse(e.to_string()))?;

            Ok(normalize(parsed, url))
        })
    }
}

/// Flatten the feed-rs model into [`ParsedFeed`], defaulting the feed URL
/// to the requested one when the payload does not declare its own.
fn normalize(feed: feed_rs::model::Feed, requested_url: &str) -> ParsedFeed {
    let feed_url = feed
        .links
        .iter()
        .find(|l| l.rel.as_deref() == Some("self"))
        .and_then(|l| clean(Some(l.href.clone())))
        .unwrap_or_else(|| requested_url.to_string());

    let site_url = feed
        .links
        .iter()
        .find(|l| l.rel.is_none() || l.rel.as_deref() == Some("alternate"))
        .and_then(|l| clean(Some(l.href.clone())));

    let title = clean(feed.title.map(|t| t.content)).unwrap_or_default();
    let description = clean(feed.description.map(|d| d.content));
    let updated_at = feed.updated.map(|t| t.timestamp());

    let entries = feed
        .entries
        .into_iter()
        .map(|entry| {
            let title = clean(entry.title.map(|t| t.content))
                .unwrap_or_else(|| entry.id.clone());
            ParsedEntry {
                ext_id: entry.id,
                url: entry.links.first().and_then(|l| clean(Some(l.href.clone()))),
                title,
                description: clean(entry.summary.map(|s| s.content)),
                content: clean(entry.content.and_then(|c| c.body)),
                published_at: entry.published.map(|t| t.timestamp()),
                updated_at: entry.updated.map(|t| t.timestamp()),
            }
        })
        .collect();

    ParsedFeed {
        feed_url,
        site_url,
        title,
        description,
        updated_at,
        entries,
    }
}

/// Empty or whitespace-only strings become "absent".
fn clean(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

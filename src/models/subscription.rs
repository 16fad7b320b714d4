use crate::errors::{AppError, AppResult};
use crate::models::normalize_tags;
use serde::{Deserialize, Serialize};

/// An in-memory grouping of feeds used for import/export. The OPML text
/// round-trip lives outside the core; this document is what crosses the
/// boundary in both directions. Never persisted as-is.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Subscription {
    pub title: Option<String>,
    #[serde(default)]
    pub feeds: Vec<SubscriptionFeed>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SubscriptionFeed {
    pub feed_url: String,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_starred: bool,
}

impl Subscription {
    /// Checks the document shape before import. Each outline needs a feed
    /// URL and a title; tag sets are normalized in place.
    pub fn validate(&mut self) -> AppResult<()> {
        for feed in &mut self.feeds {
            if feed.feed_url.trim().is_empty() {
                return Err(AppError::invalid_argument(
                    "subscription feed without a feed_url",
                ));
            }
            if feed.title.trim().is_empty() {
                return Err(AppError::invalid_argument(format!(
                    "subscription feed {} without a title",
                    feed.feed_url
                )));
            }
            feed.tags = normalize_tags(std::mem::take(&mut feed.tags));
        }
        Ok(())
    }
}

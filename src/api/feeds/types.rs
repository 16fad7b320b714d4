use crate::models::feed::Feed;
use crate::store::FeedEditOp;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct AddFeedResponse {
    pub feed: Feed,
    pub added: bool,
}

#[derive(Debug, Deserialize)]
pub struct EditFeedsRequest {
    pub feeds: Vec<FeedEditOp>,
}

#[derive(Debug, Deserialize)]
pub struct ListFeedsQuery {
    #[serde(default)]
    pub with_entries: bool,
}

#[derive(Debug, Deserialize)]
pub struct DeleteFeedsRequest {
    pub ids: Vec<i32>,
}

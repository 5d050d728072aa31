// src/ingest/types.rs
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Author of a post. Field names mirror the collector's JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub screen_name: String,
    pub name: String,
}

/// One persisted post record, the unit stored in `tweets/<date>.json`.
/// `full_text` keeps the raw body; newline collapsing happens at render time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub user: Author,
    pub full_text: String,
    pub created_at: String,
    pub tweet_url: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub videos: Vec<String>,
}

/// A reply shown under its parent post. Transient, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub user: Author,
    pub full_text: String,
}

/// One fetched post together with its promoted flag and direct replies,
/// as the read API returns it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PostBundle {
    pub post: Post,
    #[serde(default)]
    pub promoted: bool,
    #[serde(default)]
    pub replies: Vec<Reply>,
}

#[async_trait::async_trait]
pub trait PostSource: Send + Sync {
    /// Fetch the most recent posts for a stable account id, in provider order.
    /// The batch is not restartable; callers drain it in one pass.
    async fn fetch_recent(&self, account_id: &str) -> Result<Vec<PostBundle>>;
    fn name(&self) -> &'static str;
}

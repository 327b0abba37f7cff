// src/feed/mod.rs
pub mod youtube;

use anyhow::Result;

/// One entry from the recency-ordered feed. Position in the fetched page is
/// the recency rank: index 0 is the newest upload.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FeedItem {
    pub video_id: String,
    pub title: String,
}

#[async_trait::async_trait]
pub trait FeedSource: Send + Sync {
    /// Newest-first page of recent uploads, bounded by the configured page
    /// size. An error here means "skip this cycle", never "crash".
    async fn latest_videos(&self) -> Result<Vec<FeedItem>>;
    fn name(&self) -> &'static str;
}

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::counter;
use serde::Deserialize;
use std::time::Duration;

use crate::feed::{FeedItem, FeedSource};

const SEARCH_URL: &str = "https://www.googleapis.com/youtube/v3/search";
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    id: Option<ResultId>,
    snippet: Option<Snippet>,
}

// `id.videoId` is absent for channel/playlist results, which search can
// return even with type=video requested; those rows are skipped.
#[derive(Debug, Deserialize)]
struct ResultId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    title: Option<String>,
}

/// Feed source backed by the YouTube Data API v3 `search.list` endpoint,
/// ordered by publish date (newest first).
pub struct YouTubeFeed {
    mode: Mode,
    page_size: usize,
}

enum Mode {
    Http {
        api_key: String,
        channel_id: String,
        client: reqwest::Client,
    },
    // Own copy of the response body, so tests can feed arbitrary strings.
    Fixture(String),
}

impl YouTubeFeed {
    pub fn new(api_key: String, channel_id: String, page_size: usize) -> Self {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .expect("building youtube http client");
        Self {
            mode: Mode::Http {
                api_key,
                channel_id,
                client,
            },
            page_size,
        }
    }

    pub fn from_fixture_str(body: &str, page_size: usize) -> Self {
        Self {
            mode: Mode::Fixture(body.to_string()),
            page_size,
        }
    }

    fn parse_items(body: &str, page_size: usize) -> Result<Vec<FeedItem>> {
        let resp: SearchResponse =
            serde_json::from_str(body).context("parsing youtube search response")?;

        let mut out = Vec::with_capacity(resp.items.len().min(page_size));
        for it in resp.items {
            let Some(video_id) = it.id.and_then(|id| id.video_id) else {
                continue;
            };
            if video_id.is_empty() {
                continue;
            }
            let title = it.snippet.and_then(|s| s.title).unwrap_or_default();
            out.push(FeedItem { video_id, title });
            if out.len() == page_size {
                break;
            }
        }

        counter!("feed_items_total").increment(out.len() as u64);
        Ok(out)
    }
}

#[async_trait]
impl FeedSource for YouTubeFeed {
    async fn latest_videos(&self) -> Result<Vec<FeedItem>> {
        match &self.mode {
            Mode::Fixture(body) => Self::parse_items(body, self.page_size),

            Mode::Http {
                api_key,
                channel_id,
                client,
            } => {
                let max_results = self.page_size.to_string();
                let rsp = client
                    .get(SEARCH_URL)
                    .query(&[
                        ("part", "snippet"),
                        ("order", "date"),
                        ("type", "video"),
                        ("channelId", channel_id.as_str()),
                        ("maxResults", max_results.as_str()),
                        ("key", api_key.as_str()),
                    ])
                    .send()
                    .await
                    .context("youtube search get()")?;
                let rsp = rsp.error_for_status().context("youtube search status")?;
                let body = rsp.text().await.context("youtube search .text()")?;
                Self::parse_items(&body, self.page_size)
            }
        }
    }

    fn name(&self) -> &'static str {
        "YouTube"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "kind": "youtube#searchListResponse",
        "items": [
            { "id": { "kind": "youtube#video", "videoId": "vid-new" },
              "snippet": { "title": "Newest upload" } },
            { "id": { "kind": "youtube#channel", "channelId": "UCabc" },
              "snippet": { "title": "Channel row, no videoId" } },
            { "id": { "kind": "youtube#video", "videoId": "vid-old" },
              "snippet": { "title": "Older upload" } }
        ]
    }"#;

    #[tokio::test]
    async fn fixture_parse_keeps_order_and_skips_non_videos() {
        let feed = YouTubeFeed::from_fixture_str(FIXTURE, 5);
        let items = feed.latest_videos().await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].video_id, "vid-new");
        assert_eq!(items[0].title, "Newest upload");
        assert_eq!(items[1].video_id, "vid-old");
    }

    #[tokio::test]
    async fn page_size_bounds_the_result() {
        let feed = YouTubeFeed::from_fixture_str(FIXTURE, 1);
        let items = feed.latest_videos().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].video_id, "vid-new");
    }

    #[tokio::test]
    async fn garbage_body_is_an_error_not_a_panic() {
        let feed = YouTubeFeed::from_fixture_str("<html>quota exceeded</html>", 5);
        assert!(feed.latest_videos().await.is_err());
    }

    #[tokio::test]
    async fn empty_items_array_yields_empty_page() {
        let feed = YouTubeFeed::from_fixture_str(r#"{"items": []}"#, 5);
        assert!(feed.latest_videos().await.unwrap().is_empty());
    }
}

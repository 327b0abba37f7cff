// tests/common/mod.rs
#![allow(dead_code)] // not every test binary uses every helper
//
// Shared test doubles: a canned feed source and a recording announcement
// sink. The clock-sensitive tests use tokio's paused time, so instants are
// tokio instants.

use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::time::Instant;

use video_announcer::config::DedupPolicy;
use video_announcer::discord::AnnouncementSink;
use video_announcer::feed::{FeedItem, FeedSource};
use video_announcer::tracker::TrackerConfig;

pub fn items(ids: &[&str]) -> Vec<FeedItem> {
    ids.iter()
        .map(|id| FeedItem {
            video_id: id.to_string(),
            title: format!("video {id}"),
        })
        .collect()
}

pub fn tracker_config(policy: DedupPolicy, per_item_delay: Duration) -> TrackerConfig {
    TrackerConfig {
        policy,
        per_item_delay,
        recent_scan_limit: 20,
        target_channel: "chan-debug".to_string(),
    }
}

/// Feed source returning a fixed newest-first page, or an error.
pub struct StaticFeed {
    items: Vec<FeedItem>,
    fail: bool,
}

impl StaticFeed {
    pub fn new(ids: &[&str]) -> Self {
        Self {
            items: items(ids),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            items: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl FeedSource for StaticFeed {
    async fn latest_videos(&self) -> Result<Vec<FeedItem>> {
        if self.fail {
            return Err(anyhow!("search quota exceeded"));
        }
        Ok(self.items.clone())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

pub struct SentMessage {
    pub channel: String,
    pub content: String,
    pub at: Instant,
}

/// Records every send attempt (including ones it then fails) and serves a
/// canned message history for the scan policy.
#[derive(Default)]
pub struct RecordingSink {
    pub sent: Mutex<Vec<SentMessage>>,
    fail_on: Mutex<HashSet<usize>>,
    history: Mutex<Vec<String>>,
    fail_history: Mutex<bool>,
}

impl RecordingSink {
    /// Fail the nth send attempt (0-based) with an error.
    pub fn fail_send(self, index: usize) -> Self {
        self.fail_on.lock().unwrap().insert(index);
        self
    }

    pub fn with_history(self, messages: &[&str]) -> Self {
        *self.history.lock().unwrap() = messages.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn failing_history(self) -> Self {
        *self.fail_history.lock().unwrap() = true;
        self
    }

    pub fn sent_contents(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.content.clone())
            .collect()
    }
}

#[async_trait]
impl AnnouncementSink for RecordingSink {
    async fn post_message(&self, channel_id: &str, content: &str) -> Result<()> {
        let index = {
            let mut sent = self.sent.lock().unwrap();
            sent.push(SentMessage {
                channel: channel_id.to_string(),
                content: content.to_string(),
                at: Instant::now(),
            });
            sent.len() - 1
        };
        if self.fail_on.lock().unwrap().contains(&index) {
            return Err(anyhow!("discord 500"));
        }
        Ok(())
    }

    async fn recent_messages(&self, _channel_id: &str, limit: usize) -> Result<Vec<String>> {
        if *self.fail_history.lock().unwrap() {
            return Err(anyhow!("discord 429"));
        }
        let history = self.history.lock().unwrap();
        Ok(history.iter().take(limit).cloned().collect())
    }
}

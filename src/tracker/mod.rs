// src/tracker/mod.rs
//
// The video-publication tracker: decides which uploads are new relative to
// what has already been announced, orders them for readers, and schedules
// rate-limited delivery. Owns the "last announced" cursor.

pub mod dedup;
pub mod dispatch;
pub mod store;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::config::{AnnouncerConfig, DedupPolicy};
use crate::discord::AnnouncementSink;
use crate::feed::FeedSource;
use self::dedup::{cursor_plan, filter_unannounced, scan_announced_ids};
use self::store::CursorStore;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("announce_cycles_total", "Detection-and-announce cycles run.");
        describe_counter!("announce_posted_total", "Video announcements delivered.");
        describe_counter!(
            "announce_send_errors_total",
            "Announcement sends that failed (item skipped, batch continues)."
        );
        describe_counter!("feed_fetch_errors_total", "Feed fetches that failed.");
        describe_counter!("feed_items_total", "Feed items parsed from responses.");
        describe_gauge!("tracker_last_run_ts", "Unix ts when the tracker last ran.");
    });
}

/// Read-only snapshot served by the status route.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TrackerStatus {
    pub cycles: u64,
    pub last_run: Option<DateTime<Utc>>,
    pub last_announced: usize,
    pub cursor: Option<String>,
}

/// Tracker knobs, separated from the full app config so tests can build a
/// tracker without credentials.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub policy: DedupPolicy,
    pub per_item_delay: Duration,
    pub recent_scan_limit: usize,
    pub target_channel: String,
}

impl TrackerConfig {
    pub fn from_app(cfg: &AnnouncerConfig) -> Self {
        Self {
            policy: cfg.dedup_policy,
            per_item_delay: cfg.announce_delay(),
            recent_scan_limit: cfg.recent_scan_limit,
            target_channel: cfg.target_channel().to_string(),
        }
    }
}

#[derive(Default)]
struct CycleReport {
    announced: usize,
    dispatch: Option<JoinHandle<()>>,
}

pub struct Tracker {
    feed: Arc<dyn FeedSource>,
    sink: Arc<dyn AnnouncementSink>,
    store: Arc<dyn CursorStore>,
    cfg: TrackerConfig,
    // Single source of truth for "already announced" under the cursor
    // policy; only ever advances, never rolls back.
    cursor: Option<String>,
    status: Arc<RwLock<TrackerStatus>>,
}

impl Tracker {
    /// Builds the tracker and restores the cursor from the store once, at
    /// start-up. The message-scan policy ignores the restored value.
    pub async fn new(
        feed: Arc<dyn FeedSource>,
        sink: Arc<dyn AnnouncementSink>,
        store: Arc<dyn CursorStore>,
        cfg: TrackerConfig,
    ) -> Self {
        let cursor = store.load().await;
        match &cursor {
            Some(id) => tracing::info!(cursor = %id, "restored announcement cursor"),
            None => tracing::info!("no announcement cursor yet, first run"),
        }
        let status = Arc::new(RwLock::new(TrackerStatus {
            cursor: cursor.clone(),
            ..TrackerStatus::default()
        }));
        Self {
            feed,
            sink,
            store,
            cfg,
            cursor,
            status,
        }
    }

    /// Shared snapshot handle for the status route.
    pub fn status_handle(&self) -> Arc<RwLock<TrackerStatus>> {
        Arc::clone(&self.status)
    }

    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    /// One full cycle: fetch → dedup → order → dispatch → persist. Never
    /// propagates an error past this boundary; a failed cycle is logged and
    /// leaves persisted state unchanged, so the scheduler keeps firing.
    ///
    /// Returns the handle of the spawned dispatch batch (if any) so tests
    /// can await delivery; the scheduler drops it (fire-and-forget).
    pub async fn run_cycle(&mut self) -> Option<JoinHandle<()>> {
        ensure_metrics_described();
        let now = Utc::now();

        let report = match self.cycle_inner().await {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!(error = ?e, "announce cycle aborted");
                CycleReport::default()
            }
        };

        counter!("announce_cycles_total").increment(1);
        gauge!("tracker_last_run_ts").set(now.timestamp().max(0) as f64);

        if let Ok(mut st) = self.status.write() {
            st.cycles += 1;
            st.last_run = Some(now);
            st.last_announced = report.announced;
            st.cursor = self.cursor.clone();
        }

        report.dispatch
    }

    async fn cycle_inner(&mut self) -> Result<CycleReport> {
        let feed = match self.feed.latest_videos().await {
            Ok(items) => items,
            Err(e) => {
                counter!("feed_fetch_errors_total").increment(1);
                return Err(e.context("feed fetch"));
            }
        };
        if feed.is_empty() {
            tracing::debug!(source = self.feed.name(), "feed empty, skipping cycle");
            return Ok(CycleReport::default());
        }

        let (mut new_items, advance_to) = match self.cfg.policy {
            DedupPolicy::Cursor => {
                let plan = cursor_plan(self.cursor.as_deref(), &feed);
                (plan.new_items, plan.advance_to)
            }
            DedupPolicy::MessageScan => {
                // The channel itself is the ledger: rebuild the announced
                // set wholesale from its recent messages every cycle.
                let messages = self
                    .sink
                    .recent_messages(&self.cfg.target_channel, self.cfg.recent_scan_limit)
                    .await
                    .context("recent message scan")?;
                let announced = scan_announced_ids(&messages);
                (filter_unannounced(&feed, &announced), None)
            }
        };

        // The feed is newest-first; announce oldest first so the channel
        // reads chronologically.
        new_items.reverse();
        let announced = new_items.len();

        let dispatch = if new_items.is_empty() {
            None
        } else {
            tracing::info!(
                count = announced,
                channel = %self.cfg.target_channel,
                "dispatching new videos"
            );
            Some(tokio::spawn(dispatch::dispatch_delayed(
                Arc::clone(&self.sink),
                new_items,
                self.cfg.target_channel.clone(),
                self.cfg.per_item_delay,
            )))
        };

        // Persist once dispatch is *scheduled*, not once it has drained;
        // nothing here waits on the batch.
        if let Some(id) = advance_to {
            if self.cursor.as_deref() != Some(id.as_str()) {
                if let Err(e) = self.store.save(&id).await {
                    // Keep the in-memory advance; the next advance rewrites
                    // the record anyway. Worst case is a late re-announce.
                    tracing::warn!(error = ?e, "cursor save failed");
                }
                self.cursor = Some(id);
            }
        }

        Ok(CycleReport {
            announced,
            dispatch,
        })
    }
}

// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod config;
pub mod discord;
pub mod feed;
pub mod metrics;
pub mod scheduler;
pub mod tracker;

// ---- Re-exports for stable public API ----
pub use crate::config::{AnnouncerConfig, DedupPolicy};
pub use crate::discord::{AnnouncementSink, DiscordClient};
pub use crate::feed::{FeedItem, FeedSource};
pub use crate::tracker::{Tracker, TrackerConfig, TrackerStatus};

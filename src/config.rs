// src/config.rs
use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::time::Duration;

/// How "already announced" is decided each cycle.
///
/// `Cursor` keeps a single persisted last-announced id. `MessageScan` rebuilds
/// the announced set from the channel's own recent messages and needs no
/// separate store, at the cost of O(K) reads per cycle and coupling to the
/// announcement text format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupPolicy {
    Cursor,
    MessageScan,
}

impl DedupPolicy {
    fn parse(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "cursor" => Ok(Self::Cursor),
            "message-scan" | "message_scan" | "scan" => Ok(Self::MessageScan),
            other => bail!("unknown DEDUP_POLICY '{other}' (expected 'cursor' or 'message-scan')"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnnouncerConfig {
    pub poll_interval_secs: u64,
    pub announce_delay_secs: u64,
    pub feed_page_size: usize,
    pub recent_scan_limit: usize,
    pub dedup_policy: DedupPolicy,
    pub production: bool,
    pub guild_channel_id: String,
    pub guild_debug_channel_id: String,
    pub google_api_key: String,
    pub youtube_channel_id: String,
    pub discord_token: String,
    pub cursor_state_path: PathBuf,
    pub bind_addr: String,
}

impl AnnouncerConfig {
    /// Load from environment variables (call `dotenvy::dotenv()` first in the
    /// binary). Only the credentials and the active target channel are
    /// required; everything else has a default.
    pub fn from_env() -> Result<Self> {
        let production = std::env::var("APP_ENV")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let dedup_policy = match std::env::var("DEDUP_POLICY") {
            Ok(v) => DedupPolicy::parse(&v)?,
            Err(_) => DedupPolicy::Cursor,
        };

        let cfg = Self {
            poll_interval_secs: env_parse("POLL_INTERVAL_SECS", 3_600)?,
            announce_delay_secs: env_parse("ANNOUNCE_DELAY_SECS", 300)?,
            feed_page_size: env_parse("FEED_PAGE_SIZE", 5)?,
            recent_scan_limit: env_parse("RECENT_SCAN_LIMIT", 20)?,
            dedup_policy,
            production,
            guild_channel_id: std::env::var("GUILD_CHANNEL_ID").unwrap_or_default(),
            guild_debug_channel_id: std::env::var("GUILD_DEBUG_CHANNEL_ID").unwrap_or_default(),
            google_api_key: env_required("GOOGLE_API_KEY")?,
            youtube_channel_id: env_required("YOUTUBE_CHANNEL_ID")?,
            discord_token: env_required("DISCORD_TOKEN")?,
            cursor_state_path: std::env::var("CURSOR_STATE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("state/last_video.json")),
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
        };

        if cfg.target_channel().is_empty() {
            bail!(
                "no target channel configured: set {} for this environment",
                if production { "GUILD_CHANNEL_ID" } else { "GUILD_DEBUG_CHANNEL_ID" }
            );
        }
        if cfg.feed_page_size == 0 {
            bail!("FEED_PAGE_SIZE must be at least 1");
        }

        Ok(cfg)
    }

    /// Production posts to the real channel; everything else stays in the
    /// debug channel. Resolved once per dispatch, not per item.
    pub fn target_channel(&self) -> &str {
        if self.production {
            &self.guild_channel_id
        } else {
            &self.guild_debug_channel_id
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn announce_delay(&self) -> Duration {
        Duration::from_secs(self.announce_delay_secs)
    }
}

fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(v) => v.parse::<T>().with_context(|| format!("parsing {key}='{v}'")),
        Err(_) => Ok(default),
    }
}

fn env_required(key: &str) -> Result<String> {
    let v = std::env::var(key).with_context(|| format!("{key} must be set"))?;
    if v.trim().is_empty() {
        bail!("{key} is set but empty");
    }
    Ok(v)
}

//! Video Announcer — Binary Entrypoint
//! Wires the YouTube feed, the Discord sink, the cursor store, and the
//! tracker, spawns the polling scheduler, and serves the status router.

use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use video_announcer::api;
use video_announcer::config::AnnouncerConfig;
use video_announcer::discord::DiscordClient;
use video_announcer::feed::youtube::YouTubeFeed;
use video_announcer::metrics::Metrics;
use video_announcer::scheduler;
use video_announcer::tracker::{store::FileCursorStore, Tracker, TrackerConfig};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("video_announcer=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = AnnouncerConfig::from_env()?;
    let metrics = Metrics::init();

    let feed = Arc::new(YouTubeFeed::new(
        cfg.google_api_key.clone(),
        cfg.youtube_channel_id.clone(),
        cfg.feed_page_size,
    ));
    let sink = Arc::new(DiscordClient::new(cfg.discord_token.clone()));
    let store = Arc::new(FileCursorStore::new(cfg.cursor_state_path.clone()));

    let tracker = Tracker::new(feed, sink, store, TrackerConfig::from_app(&cfg)).await;
    let status = tracker.status_handle();

    scheduler::spawn(tracker, cfg.poll_interval());

    let router = api::create_router(status).merge(metrics.router());
    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!(addr = %cfg.bind_addr, "status server listening");
    axum::serve(listener, router).await?;

    Ok(())
}

// src/tracker/dispatch.rs
use metrics::counter;
use std::sync::Arc;
use std::time::Duration;

use crate::discord::AnnouncementSink;
use crate::feed::FeedItem;

pub fn announcement_line(video_id: &str) -> String {
    format!("New video out!!! Check it out here: https://www.youtube.com/watch?v={video_id}")
}

/// Send `items` strictly in list order, one message per item, suspending for
/// `per_item_delay` after each send. A failed send is logged and counted; the
/// rest of the batch still goes out (at-most-one attempt per item, no retry).
///
/// The orchestrator spawns this and does not await it — process exit cancels
/// an in-flight batch, which is accepted loss.
pub async fn dispatch_delayed(
    sink: Arc<dyn AnnouncementSink>,
    items: Vec<FeedItem>,
    channel_id: String,
    per_item_delay: Duration,
) {
    for item in items {
        let line = announcement_line(&item.video_id);
        match sink.post_message(&channel_id, &line).await {
            Ok(()) => {
                counter!("announce_posted_total").increment(1);
                tracing::info!(video_id = %item.video_id, channel = %channel_id, "announced video");
            }
            Err(e) => {
                counter!("announce_send_errors_total").increment(1);
                tracing::warn!(error = ?e, video_id = %item.video_id, "announcement send failed");
            }
        }
        tokio::time::sleep(per_item_delay).await;
    }
}
